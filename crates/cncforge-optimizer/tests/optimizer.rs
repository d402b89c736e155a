#[path = "optimizer/dialects.rs"]
mod dialects;
#[path = "optimizer/end_to_end.rs"]
mod end_to_end;
#[path = "optimizer/errors.rs"]
mod errors;
#[path = "optimizer/idempotence.rs"]
mod idempotence;
