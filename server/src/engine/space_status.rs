use crate::models::SpaceStatus;

/// The only place a space's status is computed.
///
/// `flag` is the operator-controlled part of the status (`maintenance` or not);
/// `confirmed_bookings` is how many confirmed bookings the space holds once
/// the surrounding write commits.
pub fn derive_space_status(flag: SpaceStatus, confirmed_bookings: usize) -> SpaceStatus {
    match flag {
        SpaceStatus::Maintenance => SpaceStatus::Maintenance,
        _ if confirmed_bookings > 0 => SpaceStatus::Booked,
        _ => SpaceStatus::Available,
    }
}
