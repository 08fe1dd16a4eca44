// libs/booking-cell/src/services/mod.rs
pub mod availability;
pub mod booking;
pub mod lifecycle;

pub use availability::AvailabilityService;
pub use booking::InquiryBookingService;
pub use lifecycle::InquiryLifecycleService;
