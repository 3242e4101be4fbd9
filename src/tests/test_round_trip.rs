#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use std::sync::Arc;

    use crate::description::RobotDescription;
    use crate::kinematic_traits::Kinematics;
    use crate::kinematics_impl::PoeKinematics;
    use crate::limits::LimitValidator;
    use crate::pose_solver::PoseSolver;
    use crate::seeds::SeedSequence;
    use crate::tests::test_utils::assert_joints_approx_eq;
    use crate::utils::angles::{normalize_joints, REV};
    use crate::utils::{as_radians, assert_pose_eq};

    /// Joint vectors in degrees, well inside the limits of all arms of the family.
    const CASES: [[i32; 6]; 6] = [
        [0, 0, 0, 0, 0, 0],
        [10, -20, 30, 15, 40, -25],
        [-45, 15, -10, -30, 60, 90],
        [90, -40, 50, 0, -30, 10],
        [-120, 30, -45, 45, 20, -60],
        [150, -10, 20, -90, 45, 170],
    ];

    fn descriptions() -> Vec<RobotDescription> {
        vec![RobotDescription::px100(), RobotDescription::wx200(),
             RobotDescription::wx250s(), RobotDescription::vx300s()]
    }

    #[test]
    fn test_inverse_of_forward_with_own_seed() {
        for description in descriptions() {
            let robot = PoeKinematics::new(description);
            for case in CASES.iter() {
                let joints = as_radians(&case[..robot.dof()]);
                let pose = robot.forward(&joints);
                let solution = robot.inverse(&pose, &joints);
                assert!(solution.converged, "{:?} did not converge", joints);
                assert_joints_approx_eq(&solution.joints, &joints, 1e-9);
            }
        }
    }

    #[test]
    fn test_inverse_of_forward_from_perturbed_seed() {
        for description in [RobotDescription::wx250s(), RobotDescription::vx300s()] {
            let robot = PoeKinematics::new(description);
            for case in CASES.iter().skip(1) {
                let joints = as_radians(case);
                let pose = robot.forward(&joints);
                let seed: Vec<f64> = joints.iter().map(|q| q + 0.03).collect();
                let solution = robot.inverse(&pose, &seed);
                assert!(solution.converged, "{:?} did not converge", joints);
                assert_pose_eq(&robot.forward(&solution.joints), &pose, 0.002, 0.002);
            }
        }
    }

    #[test]
    fn test_solution_a_turn_away_is_normalized() {
        // Seeding a full turn away converges a full turn away; normalization brings it back
        let description = RobotDescription::vx300s();
        let robot: Arc<dyn Kinematics> = Arc::new(PoeKinematics::new(description));
        let limits = LimitValidator::new(vec![-PI; 6], vec![PI; 6], vec![100.0; 6]);
        let solver = PoseSolver::new(robot.clone(), limits.clone());

        let joints = as_radians(&[30, -20, 30, 10, 40, -20]);
        let pose = robot.forward(&joints);
        let mut far_seed = joints.clone();
        far_seed[0] += REV;
        far_seed[5] -= REV;

        let raw = robot.inverse(&pose, &far_seed);
        assert!(raw.converged);
        assert!(!limits.compliant(&raw.joints, &joints, 2.0));

        let solved = solver.solve(&pose, SeedSequence::continuing(&far_seed), &joints, 2.0).unwrap();
        assert_joints_approx_eq(&solved, &joints, 1e-9);
        assert_eq!(normalize_joints(&solved, &limits.lower, &limits.upper), solved);
    }
}
