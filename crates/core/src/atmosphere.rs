//! International Standard Atmosphere up to the lower stratosphere.

const SEA_LEVEL_TEMPERATURE_K: f64 = 288.15;
const SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;
const TROPOSPHERE_LAPSE_K_M: f64 = -0.0065;
const TROPOPAUSE_ALTITUDE_M: f64 = 11_000.0;
const TROPOPAUSE_TEMPERATURE_K: f64 = 216.65;
const TROPOPAUSE_PRESSURE_PA: f64 = 22_632.06;
const STRATOSPHERE_CEILING_M: f64 = 20_000.0;
const GAS_CONSTANT_J_KG_K: f64 = 287.052_87;
const HEAT_CAPACITY_RATIO: f64 = 1.4;

/// Static air properties at a given geopotential altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereState {
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub density_kg_m3: f64,
    pub speed_of_sound_m_s: f64,
}

/// Evaluate the standard atmosphere at `altitude_m` (clamped to 0..20 km).
pub fn standard_atmosphere(altitude_m: f64) -> AtmosphereState {
    let altitude = altitude_m.clamp(0.0, STRATOSPHERE_CEILING_M);
    let g0 = crate::constants::G0;

    let (temperature, pressure) = if altitude < TROPOPAUSE_ALTITUDE_M {
        let temperature = SEA_LEVEL_TEMPERATURE_K + TROPOSPHERE_LAPSE_K_M * altitude;
        let exponent = -g0 / (TROPOSPHERE_LAPSE_K_M * GAS_CONSTANT_J_KG_K);
        let pressure = SEA_LEVEL_PRESSURE_PA * (temperature / SEA_LEVEL_TEMPERATURE_K).powf(exponent);
        (temperature, pressure)
    } else {
        // isothermal layer
        let pressure = TROPOPAUSE_PRESSURE_PA
            * (-g0 * (altitude - TROPOPAUSE_ALTITUDE_M)
                / (GAS_CONSTANT_J_KG_K * TROPOPAUSE_TEMPERATURE_K))
                .exp();
        (TROPOPAUSE_TEMPERATURE_K, pressure)
    };

    AtmosphereState {
        temperature_k: temperature,
        pressure_pa: pressure,
        density_kg_m3: pressure / (GAS_CONSTANT_J_KG_K * temperature),
        speed_of_sound_m_s: (HEAT_CAPACITY_RATIO * GAS_CONSTANT_J_KG_K * temperature).sqrt(),
    }
}
