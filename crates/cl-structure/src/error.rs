use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("tick {tick} is outside of the supported tick range")]
    TickOutOfBounds { tick: i64 },
    #[error("sqrt price of tick {tick} is below the smallest representable decimal")]
    SqrtPriceUnderflow { tick: i64 },
    #[error("division by zero")]
    DivisionByZero,
    #[error("decimal overflow")]
    Overflow,
    #[error("square root of negative value {value}")]
    NegativeSqrt { value: String },
    #[error("liquidity would become negative: {before} + {delta}")]
    LiquidityUnderflow { before: String, delta: String },
    #[error("negative value {value} cannot be converted to a token amount")]
    NegativeAmount { value: String },
    #[error("price must be positive, got {value}")]
    NonPositivePrice { value: String },
    #[error("malformed decimal {input:?}")]
    MalformedDecimal { input: String }
}
