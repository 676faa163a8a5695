//! Hourly performance curve
//!
//! Synthesizes a 24-point performance estimate (one value per hour of the
//! day) from a circadian cosine anchored on wake time, a faster ultradian
//! ripple, and flat offsets for sleep and stress.

use crate::models::{Chronotype, ClockTime, HourlyPerformance};
use std::f64::consts::PI;

pub const HOURS_PER_DAY: usize = 24;

/// Lowest value the curve can report
pub const MIN_PERFORMANCE: u8 = 12;

/// Highest value the curve can report
pub const MAX_PERFORMANCE: u8 = 99;

const CIRCADIAN_MIDLINE: f64 = 61.0;
const CIRCADIAN_AMPLITUDE: f64 = 27.0;
/// Hours after wake at which a bear chronotype peaks
const CIRCADIAN_PEAK_OFFSET_HOURS: f64 = 8.0;
const ULTRADIAN_AMPLITUDE: f64 = 6.0;
const ULTRADIAN_CYCLES_PER_DAY: f64 = 6.0;
const SLEEP_REFERENCE_HOURS: f64 = 7.5;
const SLEEP_WEIGHT: f64 = 4.5;
const STRESS_WEIGHT: f64 = 1.8;

/// Build the 24-hour performance curve, indexed by hour of day
pub fn build_hourly_performance(
    wake_time: ClockTime,
    chronotype: Chronotype,
    stress: u8,
    sleep_duration_hours: f64,
) -> HourlyPerformance {
    let wake_hour = f64::from(wake_time.hour());
    let shift = f64::from(chronotype.phase_shift_hours());
    let sleep_adjustment = (sleep_duration_hours - SLEEP_REFERENCE_HOURS) * SLEEP_WEIGHT;
    let stress_adjustment = f64::from(stress) * STRESS_WEIGHT;

    let mut curve = [MIN_PERFORMANCE; HOURS_PER_DAY];
    for (hour, slot) in curve.iter_mut().enumerate() {
        let h = hour as f64;
        let circadian = CIRCADIAN_MIDLINE
            + CIRCADIAN_AMPLITUDE
                * (2.0 * PI * (h - wake_hour - CIRCADIAN_PEAK_OFFSET_HOURS - shift)
                    / HOURS_PER_DAY as f64)
                    .cos();
        let ultradian = ULTRADIAN_AMPLITUDE
            * (2.0 * PI * h * ULTRADIAN_CYCLES_PER_DAY / HOURS_PER_DAY as f64).sin();

        let raw = circadian + ultradian + sleep_adjustment - stress_adjustment;
        *slot = clamp_performance(raw);
    }

    curve
}

fn clamp_performance(raw: f64) -> u8 {
    let rounded = raw.round();
    if rounded.is_nan() {
        return MIN_PERFORMANCE;
    }
    rounded.clamp(f64::from(MIN_PERFORMANCE), f64::from(MAX_PERFORMANCE)) as u8
}

/// Hour of day with the highest modeled performance (earliest on ties)
pub fn peak_hour(curve: &HourlyPerformance) -> u8 {
    let mut best = 0;
    for (hour, value) in curve.iter().enumerate() {
        if *value > curve[best] {
            best = hour;
        }
    }
    best as u8
}
