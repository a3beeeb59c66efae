pub mod in_memory;
pub mod iyzipay;
pub mod signature;
