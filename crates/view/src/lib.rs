//! Shelf view layer: the state machines the UI drives.
//! Everything here runs synchronously on the calling interaction.

#![forbid(unsafe_code)]

pub mod bus;
pub mod detail;
pub mod header;
pub mod nav;
pub mod pages;
pub mod shelves;
pub mod view;

pub use bus::{QueryBus, QueryEvent, QuerySubscription};
pub use detail::BookDetail;
pub use header::{HeaderAction, HeaderInput};
pub use nav::{Location, Route};
pub use pages::{PageWindow, Paginator, PAGE_SIZE};
pub use shelves::{build_shelves, Shelf, ShelfConfig, ShelfKind};
pub use view::{EmptyState, SearchView, ViewConfig};
