//! Cruise and reserve-cruise lengths that close the range requirements.

use sizing_core::units::m_to_nmi;
use sizing_mission::MissionMeasurements;
use tracing::debug;

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceUpdate {
    /// Cruise distance to request next iteration (m).
    pub cruise_distance: f64,
    /// Reserve cruise distance to request next iteration (m).
    pub reserve_cruise_distance: f64,
    pub distance_error_nmi: f64,
    pub reserve_error_nmi: f64,
}

/// Cruise absorbs whatever the climbs and descents leave of the required distances.
pub fn balance_distances(
    measured: &MissionMeasurements,
    mission_distance: f64,
    reserve_distance: f64,
) -> Result<DistanceUpdate, ConfigurationError> {
    let cruise_distance = mission_distance
        - (measured.climb_distance + measured.descent_distance + measured.step_climb_distance);
    if !(cruise_distance > 0.0) {
        return Err(ConfigurationError::NonPositiveCruise {
            mission_nmi: m_to_nmi(mission_distance),
            climb_nmi: m_to_nmi(measured.climb_distance),
            step_climb_nmi: m_to_nmi(measured.step_climb_distance),
            descent_nmi: m_to_nmi(measured.descent_distance),
        });
    }

    let reserve_cruise_distance =
        reserve_distance - (measured.reserve_climb_distance + measured.reserve_descent_distance);
    if !(reserve_cruise_distance > 0.0) {
        return Err(ConfigurationError::NonPositiveReserveCruise {
            reserve_nmi: m_to_nmi(reserve_distance),
            climb_nmi: m_to_nmi(measured.reserve_climb_distance),
            descent_nmi: m_to_nmi(measured.reserve_descent_distance),
        });
    }

    let update = DistanceUpdate {
        cruise_distance,
        reserve_cruise_distance,
        distance_error_nmi: m_to_nmi((measured.block_distance - mission_distance).abs()),
        reserve_error_nmi: m_to_nmi((reserve_distance - measured.reserve_distance()).abs()),
    };
    debug!(
        cruise_nmi = m_to_nmi(update.cruise_distance),
        reserve_cruise_nmi = m_to_nmi(update.reserve_cruise_distance),
        "distances balanced"
    );
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::measurements;

    #[test]
    fn requested_segments_add_up_to_mission_distance() {
        let measured = measurements();
        let mission = 19_446_000.0;
        let reserve = 370_400.0;
        let update = balance_distances(&measured, mission, reserve).expect("update");
        assert_eq!(
            update.cruise_distance
                + measured.climb_distance
                + measured.descent_distance
                + measured.step_climb_distance,
            mission
        );
        assert_eq!(
            update.reserve_cruise_distance
                + measured.reserve_climb_distance
                + measured.reserve_descent_distance,
            reserve
        );
        assert!((update.distance_error_nmi - 980_000.0 / 1_852.0).abs() < 1e-9);
        assert!((update.reserve_error_nmi - 24_600.0 / 1_852.0).abs() < 1e-9);
    }

    #[test]
    fn climb_longer_than_mission_is_a_configuration_error() {
        let measured = measurements();
        let err = balance_distances(&measured, 400_000.0, 370_400.0).expect_err("negative cruise");
        assert!(matches!(err, ConfigurationError::NonPositiveCruise { .. }));
    }

    #[test]
    fn reserve_shorter_than_reserve_climb_is_rejected() {
        let measured = measurements();
        let err = balance_distances(&measured, 19_446_000.0, 150_000.0).expect_err("negative");
        assert!(matches!(
            err,
            ConfigurationError::NonPositiveReserveCruise { .. }
        ));
    }
}
