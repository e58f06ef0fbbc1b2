pub(crate) mod ledger;
pub(crate) mod settlement;
