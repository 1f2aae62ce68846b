pub mod booking;
pub mod money;
pub mod space;
pub mod stats;
pub mod testimonial;
pub mod user;

pub use booking::{Booking, BookingDetails, BookingFilter, BookingStatus, BookingTransition, NewBooking};
pub use space::{Space, SpaceChanges, SpaceFilter, SpaceStatus, SpaceType};
pub use stats::PlatformStats;
pub use testimonial::{Testimonial, TestimonialFilter, TestimonialStatus};
pub use user::{Role, User};
