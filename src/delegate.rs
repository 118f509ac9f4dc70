use crate::change_notifier::ChangeNotifier;

/// A list row that knows how to bind itself to a holder of its `kind`.
pub trait Delegate<Holder, Payload>: ChangeNotifier<Holder, Payload> {
    /// View type. Holders are only bound to delegates of the same kind.
    fn kind(&self) -> u32;

    fn item_id(&self) -> Option<u64> {
        None
    }

    /// Applies the complete current state to `holder`.
    fn bind(&self, holder: &mut Holder, position: usize);

    fn bind_with_payloads(&self, holder: &mut Holder, position: usize, _payloads: &[Payload]) {
        self.bind(holder, position);
    }

    /// Lifecycle hooks, called by the adapter that owns the holders when the
    /// holder enters or leaves the screen and when it is recycled.
    fn on_attached(&self, _holder: &mut Holder) {}

    fn on_detached(&self, _holder: &mut Holder) {}

    fn on_unbind(&self, _holder: &mut Holder) {}

    fn same_item(&self, other: &dyn Delegate<Holder, Payload>) -> bool {
        self.kind() == other.kind()
    }

    /// Defaults to identity: only the very same delegate is unchanged.
    fn same_contents(&self, other: &dyn Delegate<Holder, Payload>) -> bool {
        std::ptr::addr_eq(std::ptr::from_ref(self), std::ptr::from_ref(other))
    }

    fn change_payload(&self, _other: &dyn Delegate<Holder, Payload>) -> Option<Payload> {
        None
    }
}
