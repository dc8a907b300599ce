#[cfg(test)]
mod tests {
    extern crate rand;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::chain::KinematicChain;
    use crate::ik::{is_reachable, IkSettings, IkSolver};
    use crate::kinematic_traits::{Kinematics, Position};
    use crate::parameters::ChainParameters;

    /// Effector positions of random in-limit poses within 90% of the reach; the gripper
    /// joint stays at zero as the solver does not move it.
    fn sample_targets(parameters: &ChainParameters, count: usize, rng: &mut StdRng) -> Vec<Position> {
        let mut chain = KinematicChain::new(parameters);
        let margin = 0.9 * chain.reach();
        let mut targets = Vec::new();
        while targets.len() < count {
            let movable = chain.joint_count() - 1;
            for index in 0..movable {
                let limits = chain.limits(index).unwrap_or_default();
                chain.set_angle(index, rng.gen_range(limits.min..=limits.max));
            }
            chain.set_angle(movable, 0.0);
            let target = chain.end_effector_position();
            if target.y >= 0.0 && (target - chain.base_position()).norm() <= margin {
                targets.push(target);
            }
        }
        targets
    }

    /// Every target is solved from the rest pose with the default settings.
    fn check_convergence(parameters: ChainParameters, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let targets = sample_targets(&parameters, 40, &mut rng);
        let solver = IkSolver::default();
        for target in &targets {
            assert!(is_reachable(&KinematicChain::new(&parameters), target));
            let mut chain = KinematicChain::new(&parameters);
            let outcome = solver.solve(&mut chain, target);
            for (angle, joint) in chain.angles().iter().zip(chain.joints()) {
                assert!(joint.limits.compliant(*angle), "angle {} outside {:?}", angle, joint.limits);
            }
            assert_eq!(chain.angles().last(), Some(&0.0));

            let distance = (chain.end_effector_position() - target).norm();
            assert!((distance - outcome.distance).abs() < 1e-9);
            assert!(outcome.iterations <= IkSettings::MAX_ITERATIONS);
            assert!(
                outcome.converged && distance < IkSettings::TOLERANCE,
                "target {:?} missed by {} after {} passes",
                target,
                distance,
                outcome.iterations
            );
        }
    }

    #[test]
    fn test_desktop_arm_reaches_sampled_targets() {
        check_convergence(ChainParameters::desktop_arm(), 7);
    }

    #[test]
    fn test_desktop_arm_reaches_sampled_targets_other_seed() {
        check_convergence(ChainParameters::desktop_arm(), 2024);
    }

    #[test]
    fn test_planar_arm_reaches_sampled_targets() {
        check_convergence(ChainParameters::planar_arm(), 11);
    }

    /// A straight arm sees the goal in line with the effector from every joint; without
    /// restarts the solve ends where only the base has turned.
    #[test]
    fn test_straight_arm_is_bent_out_of_line() {
        let target = Position::new(0.5, 2.3, 0.0);

        let mut chain = KinematicChain::new(&ChainParameters::planar_arm());
        let stuck = IkSolver::new(IkSettings {
            max_restarts: 0,
            ..IkSettings::default()
        })
        .solve(&mut chain, &target);
        assert!(!stuck.converged);
        assert!(stuck.distance > 1.0, "distance {}", stuck.distance);
        for index in 1..3 {
            assert!(chain.angle(index).unwrap_or_default().abs() < 1e-6);
        }

        let mut chain = KinematicChain::new(&ChainParameters::planar_arm());
        let outcome = IkSolver::default().solve(&mut chain, &target);
        assert!(outcome.converged, "distance {}", outcome.distance);
        assert!(chain.angle(2).unwrap_or_default().abs() > 10.0);
    }
}
