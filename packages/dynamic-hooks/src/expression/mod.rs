/**
 * Expression Module
 *
 * Encoding, evaluation and value comparison of raw binding expressions.
 */
pub mod encoder;
pub mod evaluator;
pub mod stringify;

pub use encoder::{encode, escape_double_quotes, EncodedExpression, TokenKind, TokenTable};
pub use evaluator::{evaluate, Evaluation, EvaluationOptions, Scope};
pub use stringify::{detailed_stringify, Stringified, StringifyError};
