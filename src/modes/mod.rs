mod cbc;
mod ctr;
mod ecb;
mod ige;
mod util;

pub use cbc::{CBC_IV_SIZE, CbcState};
pub use ctr::{CTR_IV_SIZE, CtrState};
pub use ige::{IGE_IV_SIZE, IgeState};

pub(crate) use cbc::{cbc_decrypt, cbc_decrypt_in_place, cbc_encrypt_in_place};
pub(crate) use ctr::ctr_apply_in_place;
pub(crate) use ecb::ecb_in_place;
pub(crate) use ige::{ige_decrypt_in_place, ige_encrypt_in_place};
pub(crate) use util::check_alignment;

/// Direction of a block transform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}
