mod ledger;
mod member;
mod month;

pub use ledger::{LedgerRow, LedgerTable};
pub use member::{Member, Roster};
pub use month::Month;
