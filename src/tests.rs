#[cfg(feature = "allow_filesystem")]
mod test_from_yaml;
mod test_ik_convergence;
mod test_grip_scenario;
