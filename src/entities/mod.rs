pub mod administrator;
pub mod complaint;
pub mod establishment;
pub mod factory;
pub mod notification;
pub mod outbox_event;
pub mod password_reset_token;
pub mod product;
pub mod purchase;
pub mod purchase_transaction;
pub mod quotation;
pub mod retail_store;
pub mod retailer;
pub mod review;
pub mod supplier;
pub mod user;
