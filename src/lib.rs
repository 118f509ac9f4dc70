mod change_notifier;
mod delegate;
mod dispatcher;

pub use change_notifier::AnyChangeNotifier;
pub use change_notifier::ChangeNotifier;
pub use delegate::Delegate;
pub use dispatcher::dispatch_change;
pub use dispatcher::ChangeDispatcher;
pub use dispatcher::ChangeEvent;
pub use dispatcher::ChangeSender;
pub use dispatcher::DrainReport;
pub use dispatcher::HolderLookup;
pub use dispatcher::ItemSource;
pub use dispatcher::Update;
