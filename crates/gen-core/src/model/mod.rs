//! Modelos neutrales (OperationId, OpResult, Invocation, TypedPayload,...)

pub mod invocation;
mod macros;
pub mod op_result;
pub mod operation;
pub mod typed_payload;

pub use invocation::Invocation;
pub use op_result::OpResult;
pub use operation::{OpContext, Operation, OperationId};
pub use typed_payload::{arg, TypedPayload};
