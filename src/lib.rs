pub mod balance;
pub mod codec;
pub mod config;
pub mod data;
pub mod util;

pub use balance::{compute_balance, BalanceResult};
pub use codec::{decode_state, encode_state, share_url, token_from_url, CodecError};
pub use config::Config;
pub use data::{Database, DatabaseError, Expense, Imported, PairState, Party, Room, RoomStore};
