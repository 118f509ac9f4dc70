use std::collections::VecDeque;

use anyhow::Context;
use parking_lot::Mutex;

use crate::delegate::Delegate;

type EventSender<T> = tokio::sync::mpsc::UnboundedSender<T>;
type EventReceiver<T> = tokio::sync::mpsc::UnboundedReceiver<T>;

const DEFAULT_MAX_REDELIVERIES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// The delegate updated the holder in place.
    Partial,
    /// The delegate declined and the holder was fully rebound.
    Rebound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent<Payload> {
    pub position: usize,
    pub payload: Option<Payload>,
}

impl<Payload> ChangeEvent<Payload> {
    pub fn new(position: usize, payload: Option<Payload>) -> Self {
        Self { position, payload }
    }
}

/// Offers partial update to `item` first and falls back to a full rebind.
pub fn dispatch_change<Holder, Payload, D>(
    item: &D,
    holder: &mut Holder,
    position: usize,
    payload: Option<&Payload>,
) -> Update
where
    D: Delegate<Holder, Payload> + ?Sized,
{
    if item.notify_changed(holder, payload) {
        log::trace!("position {} updated in place", position);
        return Update::Partial;
    }

    log::trace!("position {} declined partial update, rebinding", position);
    match payload {
        Some(payload) => item.bind_with_payloads(holder, position, std::slice::from_ref(payload)),
        None => item.bind_with_payloads(holder, position, &[]),
    }
    Update::Rebound
}

pub trait ItemSource<Holder, Payload> {
    fn item_at(&self, position: usize) -> Option<&dyn Delegate<Holder, Payload>>;
}

impl<Holder, Payload> ItemSource<Holder, Payload> for [Box<dyn Delegate<Holder, Payload>>] {
    fn item_at(&self, position: usize) -> Option<&dyn Delegate<Holder, Payload>> {
        self.get(position).map(|item| item.as_ref())
    }
}

impl<Holder, Payload> ItemSource<Holder, Payload> for Vec<Box<dyn Delegate<Holder, Payload>>> {
    fn item_at(&self, position: usize) -> Option<&dyn Delegate<Holder, Payload>> {
        self.as_slice().item_at(position)
    }
}

/// Gives the dispatcher the holder currently bound and attached at a position.
///
/// The dispatcher does not check view types: the returned holder must be the
/// one bound to the item at `position`, so its kind matches that item's kind.
pub trait HolderLookup<Holder> {
    fn holder_at(&mut self, position: usize) -> Option<&mut Holder>;
}

impl<Holder> HolderLookup<Holder> for Vec<Option<Holder>> {
    fn holder_at(&mut self, position: usize) -> Option<&mut Holder> {
        self.get_mut(position).and_then(Option::as_mut)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub partial: usize,
    pub rebound: usize,
    pub deferred: usize,
    pub dropped: usize,
}

pub struct ChangeSender<Payload> {
    event_sender: EventSender<ChangeEvent<Payload>>,
}

impl<Payload> Clone for ChangeSender<Payload> {
    fn clone(&self) -> Self {
        Self {
            event_sender: self.event_sender.clone(),
        }
    }
}

impl<Payload> ChangeSender<Payload> {
    pub fn post(&self, event: ChangeEvent<Payload>) -> anyhow::Result<()> {
        let position = event.position;
        self.event_sender
            .send(event)
            .map_err(|_| anyhow::anyhow!("change dispatcher dropped"))
            .with_context(|| format!("posting change for position {}", position))
    }

    pub fn post_change(&self, position: usize, payload: Payload) -> anyhow::Result<()> {
        self.post(ChangeEvent::new(position, Some(payload)))
    }
}

struct Pending<Payload> {
    event: ChangeEvent<Payload>,
    attempts: usize,
}

struct Queue<Payload> {
    event_receiver: EventReceiver<ChangeEvent<Payload>>,
    pending: VecDeque<Pending<Payload>>,
}

/// Delivers posted change events to bound holders on the draining thread.
pub struct ChangeDispatcher<Payload> {
    event_sender: EventSender<ChangeEvent<Payload>>,
    queue: Mutex<Queue<Payload>>,
    max_redeliveries: usize,
}

impl<Payload> Default for ChangeDispatcher<Payload> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Payload> ChangeDispatcher<Payload> {
    pub fn new() -> Self {
        let (event_sender, event_receiver) =
            tokio::sync::mpsc::unbounded_channel::<ChangeEvent<Payload>>();

        Self {
            event_sender,
            queue: Mutex::new(Queue {
                event_receiver,
                pending: VecDeque::new(),
            }),
            max_redeliveries: DEFAULT_MAX_REDELIVERIES,
        }
    }

    pub fn with_max_redeliveries(mut self, max_redeliveries: usize) -> Self {
        self.max_redeliveries = max_redeliveries;
        self
    }

    pub fn sender(&self) -> ChangeSender<Payload> {
        ChangeSender {
            event_sender: self.event_sender.clone(),
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().pending.len()
    }

    /// Delivers deferred events first, then everything posted since the last drain.
    ///
    /// Events stay queued until their turn, and the queue lock is released
    /// while delegate code runs. An event whose delegate panics is lost, the
    /// ones behind it are delivered by the next drain.
    pub fn drain<Holder, Items, Holders>(&self, items: &Items, holders: &mut Holders) -> DrainReport
    where
        Items: ItemSource<Holder, Payload> + ?Sized,
        Holders: HolderLookup<Holder> + ?Sized,
    {
        let batch_len = {
            let mut queue = self.queue.lock();
            while let Ok(event) = queue.event_receiver.try_recv() {
                queue.pending.push_back(Pending { event, attempts: 0 });
            }
            queue.pending.len()
        };

        let mut report = DrainReport::default();
        for _ in 0..batch_len {
            let Some(mut pending) = self.queue.lock().pending.pop_front() else {
                break;
            };
            let position = pending.event.position;
            let Some(item) = items.item_at(position) else {
                log::warn!("dropping change for position {}: no item", position);
                report.dropped += 1;
                continue;
            };

            match holders.holder_at(position) {
                Some(holder) => {
                    match dispatch_change(item, holder, position, pending.event.payload.as_ref()) {
                        Update::Partial => report.partial += 1,
                        Update::Rebound => report.rebound += 1,
                    }
                }
                None if pending.attempts < self.max_redeliveries => {
                    pending.attempts += 1;
                    report.deferred += 1;
                    self.queue.lock().pending.push_back(pending);
                }
                None => {
                    log::warn!(
                        "dropping change for position {}: no bound holder after {} attempts",
                        position,
                        pending.attempts
                    );
                    report.dropped += 1;
                }
            }
        }

        log::debug!("Drained changes {:?}", report);
        report
    }
}
