//! Representation and manipulation of the inertia-related properties of rigid
//! bodies.

mod tensor;
mod update;

pub use tensor::{InertiaTensor, PSD_TOLERANCE};
pub use update::InertialUpdate;

use crate::{
    InertialError, Result, fph,
    quantities::{InertiaVector, Orientation, Pose, Position, relative_pose},
};
use approx::{AbsDiffEq, RelativeEq};
use nalgebra::{Translation3, Vector3};
use std::ops::Add;

/// The inertia-related properties of a physical body: its mass, the pose of
/// its center of mass relative to the body's reference frame and its inertia
/// tensor.
///
/// The inertia tensor is defined with respect to the center of mass and
/// expressed in the axes of the center-of-mass pose.
///
/// No physical validity is enforced when the properties are created or
/// modified. Use [`InertialProperties::validate`] to check them.
#[derive(Clone, Debug, PartialEq)]
pub struct InertialProperties {
    mass: fph,
    center_of_mass_pose: Pose,
    inertia_tensor: InertiaTensor,
}

impl InertialProperties {
    /// Creates a new set of inertial properties with the given mass, the
    /// center of mass at the origin of the body frame and an identity inertia
    /// tensor.
    pub fn new(mass: fph) -> Self {
        Self::from_parts(mass, Pose::identity(), InertiaTensor::identity())
    }

    /// Creates a new set of inertial properties from the given parts.
    pub fn from_parts(mass: fph, center_of_mass_pose: Pose, inertia_tensor: InertiaTensor) -> Self {
        Self {
            mass,
            center_of_mass_pose,
            inertia_tensor,
        }
    }

    /// Returns the mass of the body.
    pub fn mass(&self) -> fph {
        self.mass
    }

    pub fn set_mass(&mut self, mass: fph) {
        self.mass = mass;
    }

    /// Returns the pose of the center of mass in the body's reference frame.
    pub fn center_of_mass_pose(&self) -> &Pose {
        &self.center_of_mass_pose
    }

    pub fn set_center_of_mass_pose(&mut self, center_of_mass_pose: Pose) {
        self.center_of_mass_pose = center_of_mass_pose;
    }

    /// Returns the position of the center of mass in the body's reference
    /// frame.
    pub fn center_of_mass(&self) -> Position {
        self.center_of_mass_pose.translation.vector.into()
    }

    /// Moves the center of mass to the given position without changing the
    /// orientation of the center-of-mass frame.
    pub fn set_center_of_mass(&mut self, center_of_mass: Position) {
        self.center_of_mass_pose.translation = Translation3::from(center_of_mass.coords);
    }

    /// Sets the center-of-mass pose from a position and roll, pitch and yaw
    /// angles.
    pub fn set_center_of_mass_from_euler_angles(
        &mut self,
        center_of_mass: Position,
        roll: fph,
        pitch: fph,
        yaw: fph,
    ) {
        self.center_of_mass_pose = Pose::from_parts(
            Translation3::from(center_of_mass.coords),
            Orientation::from_euler_angles(roll, pitch, yaw),
        );
    }

    /// Returns the inertia tensor of the body, defined with respect to the
    /// center of mass.
    pub fn inertia_tensor(&self) -> &InertiaTensor {
        &self.inertia_tensor
    }

    pub fn set_inertia_tensor(&mut self, inertia_tensor: InertiaTensor) {
        self.inertia_tensor = inertia_tensor;
    }

    /// Sets all six independent entries of the inertia tensor.
    pub fn set_inertia_matrix(
        &mut self,
        ixx: fph,
        iyy: fph,
        izz: fph,
        ixy: fph,
        ixz: fph,
        iyz: fph,
    ) {
        self.inertia_tensor = InertiaTensor::new(ixx, iyy, izz, ixy, ixz, iyz);
    }

    /// Returns the principal moments `(Ixx, Iyy, Izz)`.
    pub fn principal_moments(&self) -> InertiaVector {
        *self.inertia_tensor.principal_moments()
    }

    /// Returns the products of inertia `(Ixy, Ixz, Iyz)`.
    pub fn products_of_inertia(&self) -> InertiaVector {
        *self.inertia_tensor.products_of_inertia()
    }

    pub fn ixx(&self) -> fph {
        self.inertia_tensor.ixx()
    }

    pub fn iyy(&self) -> fph {
        self.inertia_tensor.iyy()
    }

    pub fn izz(&self) -> fph {
        self.inertia_tensor.izz()
    }

    pub fn ixy(&self) -> fph {
        self.inertia_tensor.ixy()
    }

    pub fn ixz(&self) -> fph {
        self.inertia_tensor.ixz()
    }

    pub fn iyz(&self) -> fph {
        self.inertia_tensor.iyz()
    }

    pub fn set_ixx(&mut self, ixx: fph) {
        self.inertia_tensor.set_ixx(ixx);
    }

    pub fn set_iyy(&mut self, iyy: fph) {
        self.inertia_tensor.set_iyy(iyy);
    }

    pub fn set_izz(&mut self, izz: fph) {
        self.inertia_tensor.set_izz(izz);
    }

    pub fn set_ixy(&mut self, ixy: fph) {
        self.inertia_tensor.set_ixy(ixy);
    }

    pub fn set_ixz(&mut self, ixz: fph) {
        self.inertia_tensor.set_ixz(ixz);
    }

    pub fn set_iyz(&mut self, iyz: fph) {
        self.inertia_tensor.set_iyz(iyz);
    }

    /// Computes the inertia tensor of the body about the origin of the given
    /// pose (in the body's reference frame), expressed in the axes of that
    /// pose.
    pub fn tensor_at(&self, pose: &Pose) -> InertiaTensor {
        self.inertia_tensor
            .reframed(self.mass, &self.center_of_mass_pose, pose)
    }

    /// Computes the inertia tensor of the body about the origin of its
    /// reference frame, expressed in the reference frame axes.
    pub fn tensor_at_origin(&self) -> InertiaTensor {
        self.tensor_at(&Pose::identity())
    }

    /// Returns the inertial properties expressed in a reference frame that is
    /// displaced from the body's current reference frame by the given offset.
    ///
    /// The center-of-mass pose is re-expressed relative to the offset frame.
    /// Since the inertia tensor is expressed in the center-of-mass frame,
    /// which moves rigidly with the body, evaluating it at the relocated
    /// center of mass leaves it unchanged.
    pub fn transformed(&self, frame_offset: &Pose) -> Self {
        let center_of_mass_pose = relative_pose(&self.center_of_mass_pose, frame_offset);
        Self::from_parts(self.mass, center_of_mass_pose, self.inertia_tensor)
    }

    /// Rotates the center-of-mass pose about the origin of the body's
    /// reference frame. The inertia tensor follows the center-of-mass frame.
    pub fn rotate(&mut self, rotation: &Orientation) {
        self.center_of_mass_pose = Pose::from_parts(Translation3::identity(), *rotation)
            * self.center_of_mass_pose;
    }

    /// Computes the inertial properties of the rigid union of this body and
    /// the given body, with both bodies' properties expressed in the same
    /// reference frame.
    ///
    /// The center-of-mass frame of the union is aligned with the reference
    /// frame, so its orientation is the identity rather than the principal
    /// axes of the union.
    ///
    /// # Errors
    /// Returns [`InertialError::InvalidMass`] if the total mass is not finite
    /// or does not exceed zero.
    pub fn combined_with(&self, other: &Self) -> Result<Self> {
        Self::combined([self, other])
    }

    /// Replaces these inertial properties with those of the union of this
    /// body and the given body (see [`Self::combined_with`]). The properties
    /// are left untouched if the union is invalid.
    ///
    /// # Errors
    /// Returns [`InertialError::InvalidMass`] if the total mass is not finite
    /// or does not exceed zero.
    pub fn try_add_assign(&mut self, other: &Self) -> Result<()> {
        *self = self.combined_with(other)?;
        Ok(())
    }

    /// Computes the inertial properties of the rigid union of all the given
    /// bodies, with all properties expressed in the same reference frame.
    ///
    /// # Errors
    /// Returns [`InertialError::InvalidMass`] if the total mass is not finite
    /// (including when summing finite masses overflows) or does not exceed
    /// zero, which includes the case of no bodies.
    pub fn combined<'a>(bodies: impl IntoIterator<Item = &'a Self>) -> Result<Self> {
        let bodies: Vec<&Self> = bodies.into_iter().collect();

        let mass: fph = bodies.iter().map(|body| body.mass).sum();
        if !mass.is_finite() || mass <= 0.0 {
            return Err(InertialError::InvalidMass { mass });
        }

        let center_of_mass = bodies
            .iter()
            .fold(Vector3::zeros(), |weighted_sum, body| {
                weighted_sum + body.center_of_mass_pose.translation.vector * body.mass
            })
            / mass;

        let center_of_mass_pose = Pose::from_parts(
            Translation3::from(center_of_mass),
            Orientation::identity(),
        );

        let inertia_tensor = bodies
            .iter()
            .map(|body| body.tensor_at(&center_of_mass_pose))
            .sum();

        Ok(Self::from_parts(mass, center_of_mass_pose, inertia_tensor))
    }

    /// Checks that the mass is finite and non-negative and that the inertia
    /// tensor is positive semi-definite.
    ///
    /// # Errors
    /// Returns [`InertialError::InvalidMass`] or
    /// [`InertialError::InvalidInertia`] describing the first failed check.
    pub fn validate(&self) -> Result<()> {
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(InertialError::InvalidMass { mass: self.mass });
        }
        self.inertia_tensor.validate()
    }
}

impl Default for InertialProperties {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Add for &InertialProperties {
    type Output = Result<InertialProperties>;

    fn add(self, rhs: Self) -> Self::Output {
        self.combined_with(rhs)
    }
}

impl Add for InertialProperties {
    type Output = Result<InertialProperties>;

    fn add(self, rhs: Self) -> Self::Output {
        self.combined_with(&rhs)
    }
}

impl AbsDiffEq for InertialProperties {
    type Epsilon = <fph as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        fph::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        fph::abs_diff_eq(&self.mass, &other.mass, epsilon)
            && Pose::abs_diff_eq(
                &self.center_of_mass_pose,
                &other.center_of_mass_pose,
                epsilon,
            )
            && InertiaTensor::abs_diff_eq(&self.inertia_tensor, &other.inertia_tensor, epsilon)
    }
}

impl RelativeEq for InertialProperties {
    fn default_max_relative() -> Self::Epsilon {
        fph::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        fph::relative_eq(&self.mass, &other.mass, epsilon, max_relative)
            && Pose::relative_eq(
                &self.center_of_mass_pose,
                &other.center_of_mass_pose,
                epsilon,
                max_relative,
            )
            && InertiaTensor::relative_eq(
                &self.inertia_tensor,
                &other.inertia_tensor,
                epsilon,
                max_relative,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, relative_eq};
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    prop_compose! {
        fn rotation_strategy()(
            roll in -PI..PI,
            pitch in -FRAC_PI_2..FRAC_PI_2,
            yaw in -PI..PI,
        ) -> Orientation {
            Orientation::from_euler_angles(roll, pitch, yaw)
        }
    }

    prop_compose! {
        fn pose_strategy(max_translation: fph)(
            translation_x in -max_translation..max_translation,
            translation_y in -max_translation..max_translation,
            translation_z in -max_translation..max_translation,
            rotation in rotation_strategy(),
        ) -> Pose {
            Pose::from_parts(
                Translation3::new(translation_x, translation_y, translation_z),
                rotation,
            )
        }
    }

    prop_compose! {
        fn inertial_properties_strategy()(
            mass in 0.1..10.0,
            center_of_mass_pose in pose_strategy(10.0),
            (ixx, iyy, izz) in (0.1..10.0, 0.1..10.0, 0.1..10.0),
            (ixy, ixz, iyz) in (-1.0..1.0, -1.0..1.0, -1.0..1.0),
        ) -> InertialProperties {
            InertialProperties::from_parts(
                mass,
                center_of_mass_pose,
                InertiaTensor::new(ixx, iyy, izz, ixy, ixz, iyz),
            )
        }
    }

    fn point_mass(mass: fph, x: fph, y: fph, z: fph) -> InertialProperties {
        InertialProperties::from_parts(mass, Pose::translation(x, y, z), InertiaTensor::zeros())
    }

    #[test]
    fn should_create_default_properties() {
        let properties = InertialProperties::default();
        assert_eq!(properties.mass(), 1.0);
        assert_eq!(properties.center_of_mass_pose(), &Pose::identity());
        assert_eq!(properties.principal_moments(), InertiaVector::new(1.0, 1.0, 1.0));
        assert_eq!(properties.products_of_inertia(), InertiaVector::zeros());
    }

    #[test]
    fn should_only_modify_the_set_field() {
        let mut properties = InertialProperties::new(2.0);
        let original = properties.clone();

        properties.set_ixz(0.5);
        assert_eq!(properties.ixz(), 0.5);
        assert_eq!(properties.mass(), original.mass());
        assert_eq!(properties.principal_moments(), original.principal_moments());
        assert_eq!(properties.ixy(), original.ixy());
        assert_eq!(properties.iyz(), original.iyz());
        assert_eq!(properties.center_of_mass_pose(), original.center_of_mass_pose());

        properties.set_center_of_mass(Position::new(1.0, 2.0, 3.0));
        assert_eq!(properties.center_of_mass(), Position::new(1.0, 2.0, 3.0));
        assert_eq!(properties.ixz(), 0.5);
    }

    #[test]
    fn should_keep_orientation_when_setting_center_of_mass_position() {
        let mut properties = InertialProperties::default();
        properties.set_center_of_mass_from_euler_angles(Position::origin(), 0.0, 0.0, FRAC_PI_2);
        let orientation = properties.center_of_mass_pose().rotation;

        properties.set_center_of_mass(Position::new(0.0, 1.0, 0.0));

        assert_eq!(properties.center_of_mass_pose().rotation, orientation);
        assert_eq!(properties.center_of_mass(), Position::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn should_copy_without_aliasing() {
        let original = InertialProperties::new(3.0);
        let mut copy = original.clone();

        copy.set_mass(4.0);
        copy.set_iyy(9.0);

        assert_eq!(original.mass(), 3.0);
        assert_eq!(original.iyy(), 1.0);
    }

    #[test]
    fn should_compose_two_point_masses() {
        let left = point_mass(1.0, -1.0, 0.0, 0.0);
        let right = point_mass(1.0, 1.0, 0.0, 0.0);

        let combined = (&left + &right).unwrap();

        assert_abs_diff_eq!(combined.mass(), 2.0);
        assert_abs_diff_eq!(combined.center_of_mass(), Position::origin());
        assert_abs_diff_eq!(
            *combined.inertia_tensor(),
            InertiaTensor::from_diagonal_elements(0.0, 2.0, 2.0)
        );
    }

    #[test]
    fn should_weight_center_of_mass_by_mass() {
        let heavy = point_mass(3.0, 0.0, 0.0, 0.0);
        let light = point_mass(1.0, 4.0, 0.0, 0.0);

        let combined = heavy.combined_with(&light).unwrap();

        assert_abs_diff_eq!(combined.center_of_mass(), Position::new(1.0, 0.0, 0.0));
        // 3 * 1^2 + 1 * 3^2
        assert_abs_diff_eq!(combined.iyy(), 12.0);
        assert_abs_diff_eq!(combined.izz(), 12.0);
        assert_abs_diff_eq!(combined.ixx(), 0.0);
    }

    #[test]
    fn should_reset_orientation_of_composition() {
        let mut rotated = InertialProperties::new(1.0);
        rotated.set_center_of_mass_from_euler_angles(Position::new(1.0, 0.0, 0.0), 0.4, 0.2, 1.0);

        let combined = rotated.combined_with(&rotated).unwrap();

        assert_eq!(combined.center_of_mass_pose().rotation, Orientation::identity());
    }

    #[test]
    fn should_fail_composing_bodies_without_mass() {
        let massless = InertialProperties::new(0.0);
        assert!(matches!(
            massless.combined_with(&massless),
            Err(InertialError::InvalidMass { mass }) if mass == 0.0
        ));
        assert!(matches!(
            InertialProperties::new(1.0) + InertialProperties::new(-1.0),
            Err(InertialError::InvalidMass { .. })
        ));
        assert!(matches!(
            InertialProperties::combined([]),
            Err(InertialError::InvalidMass { .. })
        ));
    }

    #[test]
    fn should_fail_composing_bodies_with_infinite_total_mass() {
        assert!(matches!(
            InertialProperties::new(fph::INFINITY).combined_with(&InertialProperties::new(1.0)),
            Err(InertialError::InvalidMass { mass }) if mass == fph::INFINITY
        ));

        let heavy = InertialProperties::new(1e308);
        assert!(matches!(
            heavy.combined_with(&heavy),
            Err(InertialError::InvalidMass { mass }) if mass.is_infinite()
        ));

        assert!(matches!(
            InertialProperties::new(fph::NAN) + InertialProperties::new(1.0),
            Err(InertialError::InvalidMass { .. })
        ));
    }

    #[test]
    fn should_leave_properties_untouched_on_failed_accumulation() {
        let mut properties = InertialProperties::new(-1.0);
        let original = properties.clone();

        assert!(properties.try_add_assign(&InertialProperties::new(1.0)).is_err());
        assert_eq!(properties, original);
    }

    #[test]
    fn should_accumulate_like_addition() {
        let mut accumulated = point_mass(2.0, 0.0, 1.0, 0.0);
        let other = InertialProperties::from_parts(
            1.0,
            Pose::translation(0.0, 0.0, 2.0),
            InertiaTensor::from_diagonal_elements(0.5, 0.5, 0.5),
        );
        let added = (&accumulated + &other).unwrap();

        accumulated.try_add_assign(&other).unwrap();

        assert_eq!(accumulated, added);
    }

    #[test]
    fn should_rotate_center_of_mass_pose_about_body_origin() {
        let mut properties = InertialProperties::default();
        properties.set_center_of_mass(Position::new(1.0, 0.0, 0.0));
        let rotation = Orientation::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);

        properties.rotate(&rotation);

        assert_abs_diff_eq!(
            properties.center_of_mass(),
            Position::new(0.0, 1.0, 0.0),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            properties.center_of_mass_pose().rotation,
            rotation,
            epsilon = 1e-12
        );
        assert_eq!(properties.inertia_tensor(), &InertiaTensor::identity());
    }

    #[test]
    fn should_not_modify_receiver_when_transforming() {
        let properties = point_mass(2.0, 1.0, 2.0, 3.0);
        let original = properties.clone();

        let transformed = properties.transformed(&Pose::translation(1.0, 0.0, 0.0));

        assert_eq!(properties, original);
        assert_abs_diff_eq!(transformed.center_of_mass(), Position::new(0.0, 2.0, 3.0));
        assert_eq!(transformed.mass(), 2.0);
    }

    #[test]
    fn should_validate_mass_and_tensor() {
        assert!(InertialProperties::default().validate().is_ok());
        assert!(InertialProperties::new(0.0).validate().is_ok());
        assert!(matches!(
            InertialProperties::new(-1.0).validate(),
            Err(InertialError::InvalidMass { .. })
        ));
        assert!(matches!(
            InertialProperties::new(fph::NAN).validate(),
            Err(InertialError::InvalidMass { .. })
        ));

        let mut properties = InertialProperties::default();
        properties.set_izz(-2.0);
        assert!(matches!(
            properties.validate(),
            Err(InertialError::InvalidInertia { .. })
        ));
    }

    proptest! {
        #[test]
        fn should_leave_properties_unchanged_under_identity_offset(
            properties in inertial_properties_strategy(),
        ) {
            let transformed = properties.transformed(&Pose::identity());
            prop_assert!(relative_eq!(transformed, properties, epsilon = 1e-12));
        }
    }

    proptest! {
        #[test]
        fn should_compose_sequential_frame_offsets(
            properties in inertial_properties_strategy(),
            first_offset in pose_strategy(10.0),
            second_offset in pose_strategy(10.0),
        ) {
            let sequential = properties.transformed(&first_offset).transformed(&second_offset);
            let composed = properties.transformed(&(first_offset * second_offset));
            prop_assert!(relative_eq!(sequential, composed, epsilon = 1e-9, max_relative = 1e-9));
        }
    }

    proptest! {
        #[test]
        fn should_give_frame_independent_tensor_about_fixed_pose(
            properties in inertial_properties_strategy(),
            frame_offset in pose_strategy(10.0),
            pose in pose_strategy(10.0),
        ) {
            let tensor = properties.tensor_at(&pose);
            let tensor_in_offset_frame = properties
                .transformed(&frame_offset)
                .tensor_at(&relative_pose(&pose, &frame_offset));
            prop_assert!(relative_eq!(
                tensor,
                tensor_in_offset_frame,
                epsilon = 1e-8 * tensor.max_element().max(1.0),
                max_relative = 1e-9
            ));
        }
    }

    proptest! {
        #[test]
        fn should_compose_commutatively(
            a in inertial_properties_strategy(),
            b in inertial_properties_strategy(),
        ) {
            let ab = (&a + &b).unwrap();
            let ba = (&b + &a).unwrap();
            prop_assert!(relative_eq!(
                ab,
                ba,
                epsilon = 1e-9 * ab.inertia_tensor().max_element().max(1.0),
                max_relative = 1e-9
            ));
        }
    }

    proptest! {
        #[test]
        fn should_compose_associatively(
            a in inertial_properties_strategy(),
            b in inertial_properties_strategy(),
            c in inertial_properties_strategy(),
        ) {
            let left = ((&a + &b).unwrap() + c.clone()).unwrap();
            let right = (a + (b + c).unwrap()).unwrap();
            prop_assert!(relative_eq!(
                left,
                right,
                epsilon = 1e-9 * left.inertia_tensor().max_element().max(1.0),
                max_relative = 1e-9
            ));
        }
    }

    proptest! {
        #[test]
        fn should_reframe_body_when_composing_with_massless_body(
            properties in inertial_properties_strategy(),
            massless_pose in pose_strategy(10.0),
        ) {
            let massless = InertialProperties::from_parts(0.0, massless_pose, InertiaTensor::zeros());

            let combined = properties.combined_with(&massless).unwrap();
            let aggregate_pose = Pose::from_parts(
                properties.center_of_mass_pose().translation,
                Orientation::identity(),
            );

            prop_assert_eq!(combined.mass(), properties.mass());
            prop_assert!(relative_eq!(
                combined.center_of_mass_pose(),
                &aggregate_pose,
                epsilon = 1e-12,
                max_relative = 1e-12
            ));
            prop_assert!(relative_eq!(
                combined.inertia_tensor(),
                &properties.tensor_at(&aggregate_pose),
                epsilon = 1e-12,
                max_relative = 1e-12
            ));
        }
    }

    proptest! {
        #[test]
        fn should_match_pairwise_composition_when_combining_many(
            a in inertial_properties_strategy(),
            b in inertial_properties_strategy(),
            c in inertial_properties_strategy(),
        ) {
            let combined = InertialProperties::combined([&a, &b, &c]).unwrap();
            let pairwise = ((&a + &b).unwrap() + c).unwrap();
            prop_assert!(relative_eq!(
                combined,
                pairwise,
                epsilon = 1e-9 * combined.inertia_tensor().max_element().max(1.0),
                max_relative = 1e-9
            ));
        }
    }
}
