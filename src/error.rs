#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("entropy source failure: {0}")]
    Entropy(#[from] rand::Error),
    #[error("at least one chosen-plaintext pair is required")]
    NoPairs,
    #[error("{0} pairs requested but only 255 distinct non-zero differences exist")]
    TooManyPairs(usize),
    #[error("pair {pair} has a zero input difference")]
    ZeroDifference { pair: usize },
    #[error("input difference {delta:#04x} is used by more than one pair")]
    DuplicateDifference { delta: u8 },
    #[error("enumeration bound {bound:#x} exceeds the 24-bit round-key space")]
    BoundTooLarge { bound: u64 },
}
