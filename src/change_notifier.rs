use std::ops::Deref;
use std::sync::Arc;

/// Lets a list item apply a change payload to its bound holder in place.
///
/// Returning `true` means every visible part of `holder` affected by `payload`
/// is now current and the caller must not rebind. Returning `false` means the
/// holder was left untouched and the caller has to do a full rebind.
/// `None` payload means the change is unknown.
pub trait ChangeNotifier<Holder, Payload> {
    fn notify_changed(&self, _holder: &mut Holder, _payload: Option<&Payload>) -> bool {
        false
    }
}

pub struct AnyChangeNotifier<Holder, Payload> {
    value: Box<dyn ChangeNotifier<Holder, Payload> + Send + Sync>,
}

impl<Holder, Payload> AnyChangeNotifier<Holder, Payload> {
    pub fn new(value: Box<dyn ChangeNotifier<Holder, Payload> + Send + Sync>) -> Self {
        Self { value }
    }
}

impl<Holder, Payload> ChangeNotifier<Holder, Payload> for AnyChangeNotifier<Holder, Payload> {
    fn notify_changed(&self, holder: &mut Holder, payload: Option<&Payload>) -> bool {
        self.value.notify_changed(holder, payload)
    }
}

impl<T, Holder, Payload> ChangeNotifier<Holder, Payload> for Arc<T>
where
    T: ChangeNotifier<Holder, Payload> + ?Sized,
{
    fn notify_changed(&self, holder: &mut Holder, payload: Option<&Payload>) -> bool {
        self.deref().notify_changed(holder, payload)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default, Clone, PartialEq, Debug)]
    struct Holder {
        title: String,
        subtitle: String,
        subtitle_visible: bool,
    }

    #[derive(Debug)]
    enum Payload {
        Title(String),
        SubtitleHidden,
        Unsupported,
    }

    struct Row;

    impl ChangeNotifier<Holder, Payload> for Row {
        fn notify_changed(&self, holder: &mut Holder, payload: Option<&Payload>) -> bool {
            match payload {
                Some(Payload::Title(title)) => {
                    holder.title = title.clone();
                    true
                }
                Some(Payload::SubtitleHidden) => {
                    holder.subtitle_visible = false;
                    true
                }
                Some(Payload::Unsupported) | None => false,
            }
        }
    }

    struct Plain;

    impl ChangeNotifier<Holder, Payload> for Plain {}

    fn holder() -> Holder {
        Holder {
            title: "A".to_string(),
            subtitle: "sub".to_string(),
            subtitle_visible: true,
        }
    }

    #[test]
    fn test_applies_title_in_place() {
        let mut h = holder();
        assert!(Row.notify_changed(&mut h, Some(&Payload::Title("B".to_string()))));
        assert_eq!(h.title, "B");
        assert_eq!(h.subtitle, "sub");
    }

    #[test]
    fn test_default_declines_and_leaves_holder() {
        let mut h = holder();
        assert!(!Plain.notify_changed(&mut h, Some(&Payload::Title("B".to_string()))));
        assert!(!Plain.notify_changed(&mut h, None));
        assert_eq!(h, holder());
    }

    #[test]
    fn test_decline_is_noop() {
        let mut h = holder();
        assert!(!Row.notify_changed(&mut h, Some(&Payload::Unsupported)));
        assert!(!Row.notify_changed(&mut h, None));
        assert_eq!(h, holder());
    }

    #[test]
    fn test_idempotent_when_accepted() {
        let payload = Payload::SubtitleHidden;
        let mut h = holder();
        assert!(Row.notify_changed(&mut h, Some(&payload)));
        let once = h.clone();
        assert!(Row.notify_changed(&mut h, Some(&payload)));
        assert_eq!(h, once);
    }

    #[test]
    fn test_dynamic_dispatch() {
        let notifiers: Vec<AnyChangeNotifier<Holder, Payload>> = vec![
            AnyChangeNotifier::new(Box::new(Row)),
            AnyChangeNotifier::new(Box::new(Plain)),
            AnyChangeNotifier::new(Box::new(Arc::new(Row))),
        ];
        let payload = Payload::Title("C".to_string());
        let results: Vec<bool> = notifiers
            .iter()
            .map(|n| n.notify_changed(&mut holder(), Some(&payload)))
            .collect();
        assert_eq!(results, vec![true, false, true]);
    }
}
