pub mod convert;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod kind;
pub mod markup;
pub mod processor;
pub mod registry;
