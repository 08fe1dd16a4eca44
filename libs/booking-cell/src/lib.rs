// libs/booking-cell/src/lib.rs
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    AvailabilitySettings, AvailableSlotView, BookingError, BreakWindow, CancelInquiryRequest,
    GenerateAvailabilityRequest, Inquiry, InquirySearchQuery, InquiryStats, InquiryStatus,
    MeetingType, RescheduleInquiryRequest, SubmitInquiryRequest, Timeslot,
};
pub use router::booking_routes;
pub use services::{AvailabilityService, InquiryBookingService, InquiryLifecycleService};
