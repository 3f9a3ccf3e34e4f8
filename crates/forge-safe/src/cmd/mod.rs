pub mod delete_batch;
pub mod get_safe_payloads;
pub mod propose_batch;
pub mod safe_sign;
pub mod sign_batch;
pub mod sign_data;
pub mod sign_hash;
pub mod sign_message;
