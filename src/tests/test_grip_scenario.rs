#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nalgebra::Vector3;

    use crate::kinematic_traits::{Kinematics, Position};
    use crate::log_sink::{LogLevel, MemorySink};
    use crate::parameters::ChainParameters;
    use crate::scene::{SceneBody, SceneObject};
    use crate::scripting::session::ScriptStatus;
    use crate::settings::SimulationSettings;
    use crate::workcell::Workcell;

    const DT: f64 = 1.0 / 60.0;

    fn planar_cell() -> (Workcell, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let cell = Workcell::new(&ChainParameters::planar_arm(), &SimulationSettings::default(), sink.clone());
        (cell, sink)
    }

    /// A box whose top face is 0.05 below (1.5, 2.0, 0.0)
    fn scene() -> Vec<Box<dyn SceneObject>> {
        vec![Box::new(SceneBody::cuboid(
            "crate",
            Vector3::new(0.2, 0.2, 0.2),
            Position::new(1.5, 1.75, 0.0),
        ))]
    }

    #[test]
    fn test_pick_and_place() {
        let (mut cell, sink) = planar_cell();
        let mut scene = scene();
        cell.load_script(
            r#"
            -- pick
            moveLinear(1.5, 2.0, 0.0)
            gripObject()
            -- carry over to the other side
            moveLinear(-1.5, 2.0, 0.0)
            releaseObject()
            moveLinear(0.0, 3.0, 0.0)
            "#,
        )
        .unwrap();
        cell.run();

        let mut frames = 0;
        let mut carried = false;
        while cell.session.is_running() {
            cell.update(DT, &mut scene);
            if cell.arm.gripper.is_gripping() {
                // Rigidly attached: the distance to the effector does not change
                let gap = (scene[0].position() - cell.arm.chain.end_effector_position()).norm();
                assert!((gap - 0.25).abs() < 1e-2, "gap {}", gap);
                carried = true;
            }
            frames += 1;
            assert!(frames < 2000);
        }

        assert!(carried);
        assert_eq!(cell.session.status(), ScriptStatus::Finished);
        assert!(!cell.arm.gripper.is_gripping());
        assert!(sink.contains("Object 0 gripped"));
        assert!(sink.contains("Object 0 released"));
        assert_eq!(sink.count(LogLevel::Warning), 0);

        // Left where it was released, next to the drop point
        let dropped = scene[0].position();
        let gap = (dropped - Position::new(-1.5, 2.0, 0.0)).norm();
        assert!((gap - 0.25).abs() < 1e-2, "dropped at {:?}", dropped);

        // Nothing moves it any more
        for _ in 0..30 {
            cell.update(DT, &mut scene);
        }
        assert_eq!(scene[0].position(), dropped);
    }

    #[test]
    fn test_grip_with_nothing_in_reach() {
        let (mut cell, sink) = planar_cell();
        let mut scene = scene();
        let start = scene[0].position();
        cell.load_script("gripObject()\nmoveLinear(1.0, 2.5, 0.0)").unwrap();
        cell.run();
        while cell.session.is_running() {
            cell.update(DT, &mut scene);
        }
        assert_eq!(cell.session.status(), ScriptStatus::Finished);
        assert!(sink.contains("nothing to grip"));
        assert!(!cell.arm.gripper.is_gripping());
        assert_eq!(scene[0].position(), start);
    }
}
