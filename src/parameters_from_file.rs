//! Supports reading chain descriptors and simulation settings from YAML files (optional)

use std::path::Path;

use nalgebra::{Point3, Vector3};
use yaml_rust2::{Yaml, YamlLoader};

use crate::constraints::JointLimits;
use crate::parameter_error::ParameterError;
use crate::parameters::{ChainParameters, JointParameters};
use crate::settings::SimulationSettings;

/// Number, accepting integer YAML scalars as well.
fn as_number(value: &Yaml) -> Option<f64> {
    match value {
        Yaml::Real(_) => value.as_f64(),
        Yaml::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

fn number(value: &Yaml, field: &str) -> Result<f64, ParameterError> {
    if value.is_badvalue() {
        return Err(ParameterError::MissingField(field.to_string()));
    }
    as_number(value).ok_or_else(|| ParameterError::ParseError(format!("{} is not a number", field)))
}

/// Optional number: absent means the default, present must parse.
fn number_or(value: &Yaml, field: &str, default: f64) -> Result<f64, ParameterError> {
    if value.is_badvalue() {
        Ok(default)
    } else {
        number(value, field)
    }
}

fn triple(value: &Yaml, field: &str) -> Result<[f64; 3], ParameterError> {
    let items = value
        .as_vec()
        .ok_or_else(|| ParameterError::MissingField(field.to_string()))?;
    if items.len() != 3 {
        return Err(ParameterError::InvalidLength {
            expected: 3,
            found: items.len(),
        });
    }
    Ok([
        number(&items[0], field)?,
        number(&items[1], field)?,
        number(&items[2], field)?,
    ])
}

fn first_document(contents: &str) -> Result<Yaml, ParameterError> {
    let docs = YamlLoader::load_from_str(contents).map_err(|e| ParameterError::ParseError(e.to_string()))?;
    docs.into_iter()
        .next()
        .ok_or_else(|| ParameterError::ParseError("empty YAML document".to_string()))
}

impl ChainParameters {
    /// Read the chain descriptor from a YAML file like this:
    /// ```yaml
    /// arm_joints:
    ///   - pivot: [0.0, 0.0, 0.0]
    ///     axis: [0.0, 1.0, 0.0]
    ///     limits: [-180.0, 180.0]
    ///   - pivot: [0.0, 100.0, 0.0]
    ///     axis: [0.0, 0.0, 1.0]
    ///     limits: [-90, 90]
    /// arm_tip: [-426.0, 708.0, 0.0]
    /// arm_scale: 0.01
    /// ```
    /// Limits default to a full turn, the scale to 1. This is the format `to_yaml` writes.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        let doc = first_document(contents)?;

        let rows = doc["arm_joints"]
            .as_vec()
            .ok_or_else(|| ParameterError::MissingField("arm_joints".to_string()))?;
        if rows.is_empty() {
            return Err(ParameterError::InvalidValue("arm_joints is empty".to_string()));
        }

        let mut joints = Vec::with_capacity(rows.len());
        for row in rows {
            let pivot = triple(&row["pivot"], "pivot")?;
            let axis = triple(&row["axis"], "axis")?;
            if Vector3::from(axis).norm() == 0.0 {
                return Err(ParameterError::InvalidValue("joint axis is zero".to_string()));
            }
            let limits = if row["limits"].is_badvalue() {
                JointLimits::FULL_TURN
            } else {
                let pair = row["limits"]
                    .as_vec()
                    .ok_or_else(|| ParameterError::ParseError("limits must be [min, max]".to_string()))?;
                if pair.len() != 2 {
                    return Err(ParameterError::InvalidLength {
                        expected: 2,
                        found: pair.len(),
                    });
                }
                JointLimits::new(number(&pair[0], "limits")?, number(&pair[1], "limits")?)
            };
            joints.push(JointParameters {
                pivot: Point3::from(pivot),
                axis: Vector3::from(axis),
                limits,
            });
        }

        let tip = Point3::from(triple(&doc["arm_tip"], "arm_tip")?);
        let scale = number_or(&doc["arm_scale"], "arm_scale", 1.0)?;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ParameterError::InvalidValue(format!("arm_scale must be positive, found {}", scale)));
        }

        Ok(ChainParameters { joints, tip, scale })
    }
}

impl SimulationSettings {
    /// Read the simulation settings from a YAML file. Every field is optional:
    /// ```yaml
    /// ik:
    ///   max_iterations: 100
    ///   damping: 1.0
    ///   tolerance: 0.001
    ///   min_improvement: 0.0001
    ///   max_restarts: 30
    /// trajectory:
    ///   intervals: 50
    ///   arc_height_ratio: 0.5
    ///   spline_lift_ratio: 0.3
    /// gripper:
    ///   radius: 0.5
    ///   ray_length: 0.25
    /// animation_duration: 1.0
    /// grip_settle_seconds: 0.5
    /// ```
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        let doc = first_document(contents)?;
        let mut settings = SimulationSettings::default();

        let ik = &doc["ik"];
        settings.ik.max_iterations = count_or(&ik["max_iterations"], "max_iterations", settings.ik.max_iterations, 1)?;
        settings.ik.damping = number_or(&ik["damping"], "damping", settings.ik.damping)?;
        settings.ik.tolerance = number_or(&ik["tolerance"], "tolerance", settings.ik.tolerance)?;
        settings.ik.min_improvement = number_or(&ik["min_improvement"], "min_improvement", settings.ik.min_improvement)?;
        settings.ik.max_restarts = count_or(&ik["max_restarts"], "max_restarts", settings.ik.max_restarts, 0)?;
        if !(settings.ik.damping > 0.0 && settings.ik.damping <= 1.0) {
            return Err(ParameterError::InvalidValue(format!(
                "damping must be in (0, 1], found {}",
                settings.ik.damping
            )));
        }

        let trajectory = &doc["trajectory"];
        settings.trajectory.intervals = count_or(&trajectory["intervals"], "intervals", settings.trajectory.intervals, 1)?;
        settings.trajectory.arc_height_ratio = number_or(
            &trajectory["arc_height_ratio"],
            "arc_height_ratio",
            settings.trajectory.arc_height_ratio,
        )?;
        settings.trajectory.spline_lift_ratio = number_or(
            &trajectory["spline_lift_ratio"],
            "spline_lift_ratio",
            settings.trajectory.spline_lift_ratio,
        )?;

        let gripper = &doc["gripper"];
        settings.gripper.radius = number_or(&gripper["radius"], "radius", settings.gripper.radius)?;
        settings.gripper.ray_length = number_or(&gripper["ray_length"], "ray_length", settings.gripper.ray_length)?;

        settings.animation_duration = number_or(
            &doc["animation_duration"],
            "animation_duration",
            settings.animation_duration,
        )?;
        if !(settings.animation_duration.is_finite() && settings.animation_duration > 0.0) {
            return Err(ParameterError::InvalidValue(format!(
                "animation_duration must be positive, found {}",
                settings.animation_duration
            )));
        }
        settings.grip_settle_seconds = number_or(
            &doc["grip_settle_seconds"],
            "grip_settle_seconds",
            settings.grip_settle_seconds,
        )?;
        if !(settings.grip_settle_seconds.is_finite() && settings.grip_settle_seconds >= 0.0) {
            return Err(ParameterError::InvalidValue(format!(
                "grip_settle_seconds must not be negative, found {}",
                settings.grip_settle_seconds
            )));
        }

        Ok(settings)
    }
}

fn count_or(value: &Yaml, field: &str, default: usize, minimum: usize) -> Result<usize, ParameterError> {
    if value.is_badvalue() {
        return Ok(default);
    }
    value
        .as_i64()
        .and_then(|v| usize::try_from(v).ok())
        .filter(|v| *v >= minimum)
        .ok_or_else(|| ParameterError::ParseError(format!("{} must be an integer of at least {}", field, minimum)))
}
