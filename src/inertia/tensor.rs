//! Representation and reframing of inertia tensors.

use crate::{
    InertialError, Result, fph,
    quantities::{Direction, InertiaVector, Orientation, Pose, relative_pose},
};
use approx::{AbsDiffEq, RelativeEq};
use nalgebra::{Matrix3, Vector3};
use std::{
    iter::Sum,
    ops::{Add, AddAssign},
};

/// Tolerance, relative to the largest eigenvalue magnitude (or one), for how
/// negative an eigenvalue may be before a tensor is considered not positive
/// semi-definite.
pub const PSD_TOLERANCE: fph = 1e-9;

/// The inertia tensor of a physical body.
///
/// Only the six independent entries of the symmetric tensor are stored: the
/// principal moments `(Ixx, Iyy, Izz)` and the products of inertia
/// `(Ixy, Ixz, Iyz)`. The full matrix is assembled on demand.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InertiaTensor {
    moments: InertiaVector,
    products: InertiaVector,
}

impl InertiaTensor {
    /// Creates a new identity inertia tensor.
    #[inline]
    pub fn identity() -> Self {
        Self::from_diagonal_elements(1.0, 1.0, 1.0)
    }

    /// Creates a new inertia tensor with all entries zero, as for a point
    /// mass about its own position.
    #[inline]
    pub fn zeros() -> Self {
        Self::from_moments_and_products(InertiaVector::zeros(), InertiaVector::zeros())
    }

    /// Creates a new inertia tensor with the given entries.
    #[inline]
    pub fn new(ixx: fph, iyy: fph, izz: fph, ixy: fph, ixz: fph, iyz: fph) -> Self {
        Self::from_moments_and_products(
            InertiaVector::new(ixx, iyy, izz),
            InertiaVector::new(ixy, ixz, iyz),
        )
    }

    /// Creates a new inertia tensor with the given principal moments
    /// `(Ixx, Iyy, Izz)` and products of inertia `(Ixy, Ixz, Iyz)`.
    #[inline]
    pub fn from_moments_and_products(moments: InertiaVector, products: InertiaVector) -> Self {
        Self { moments, products }
    }

    /// Creates a new diagonal inertia tensor with the given diagonal elements.
    #[inline]
    pub fn from_diagonal_elements(ixx: fph, iyy: fph, izz: fph) -> Self {
        Self::new(ixx, iyy, izz, 0.0, 0.0, 0.0)
    }

    /// Creates an inertia tensor from the diagonal and upper triangle of the
    /// given matrix. The lower triangle is ignored.
    #[inline]
    pub fn from_matrix(matrix: &Matrix3<fph>) -> Self {
        Self::new(
            matrix[(0, 0)],
            matrix[(1, 1)],
            matrix[(2, 2)],
            matrix[(0, 1)],
            matrix[(0, 2)],
            matrix[(1, 2)],
        )
    }

    /// Assembles the symmetric inertia matrix.
    #[inline]
    pub fn matrix(&self) -> Matrix3<fph> {
        let [ixx, iyy, izz]: [fph; 3] = self.moments.into();
        let [ixy, ixz, iyz]: [fph; 3] = self.products.into();
        Matrix3::new(
            ixx, ixy, ixz, //
            ixy, iyy, iyz, //
            ixz, iyz, izz,
        )
    }

    /// Returns the principal moments `(Ixx, Iyy, Izz)`.
    #[inline]
    pub fn principal_moments(&self) -> &InertiaVector {
        &self.moments
    }

    /// Returns the products of inertia `(Ixy, Ixz, Iyz)`.
    #[inline]
    pub fn products_of_inertia(&self) -> &InertiaVector {
        &self.products
    }

    #[inline]
    pub fn ixx(&self) -> fph {
        self.moments.x
    }

    #[inline]
    pub fn iyy(&self) -> fph {
        self.moments.y
    }

    #[inline]
    pub fn izz(&self) -> fph {
        self.moments.z
    }

    #[inline]
    pub fn ixy(&self) -> fph {
        self.products.x
    }

    #[inline]
    pub fn ixz(&self) -> fph {
        self.products.y
    }

    #[inline]
    pub fn iyz(&self) -> fph {
        self.products.z
    }

    #[inline]
    pub fn set_ixx(&mut self, ixx: fph) {
        self.moments.x = ixx;
    }

    #[inline]
    pub fn set_iyy(&mut self, iyy: fph) {
        self.moments.y = iyy;
    }

    #[inline]
    pub fn set_izz(&mut self, izz: fph) {
        self.moments.z = izz;
    }

    #[inline]
    pub fn set_ixy(&mut self, ixy: fph) {
        self.products.x = ixy;
    }

    #[inline]
    pub fn set_ixz(&mut self, ixz: fph) {
        self.products.y = ixz;
    }

    #[inline]
    pub fn set_iyz(&mut self, iyz: fph) {
        self.products.z = iyz;
    }

    /// Computes the moment of inertia about the given axis passing through the
    /// same point this inertia tensor is defined with respect to.
    #[inline]
    pub fn moment_about_axis(&self, axis: &Direction) -> fph {
        axis.dot(&(self.matrix() * axis.as_ref()))
    }

    /// Computes the inertia tensor corresponding to rotating the body with the
    /// given rotation quaternion.
    #[inline]
    pub fn rotated(&self, rotation: &Orientation) -> Self {
        let rotation_matrix = rotation.to_rotation_matrix().into_inner();
        Self::from_matrix(&(rotation_matrix * self.matrix() * rotation_matrix.transpose()))
    }

    /// Uses the parallel axis theorem to compute the differences that must be
    /// added to the center-of-mass moments and products of inertia for them
    /// to be defined with respect to the point at the given displacement
    /// from the center of mass.
    ///
    /// The deltas are quadratic in the displacement, so its sign does not
    /// matter.
    #[inline]
    pub fn compute_delta_from_com_moments_and_products_of_inertia(
        mass: fph,
        displacement_from_com: &Vector3<fph>,
    ) -> (InertiaVector, InertiaVector) {
        let squared_displacement = displacement_from_com.component_mul(displacement_from_com);

        let moment_of_inertia_deltas =
            mass * (squared_displacement.yzx() + squared_displacement.zxy());

        let [x, y, z]: [fph; 3] = (*displacement_from_com).into();
        let product_of_inertia_deltas = -mass * InertiaVector::new(x * y, x * z, y * z);

        (moment_of_inertia_deltas, product_of_inertia_deltas)
    }

    /// Computes the inertia tensor of a body with the given mass about the
    /// point at the given displacement from its center of mass, assuming this
    /// tensor is defined with respect to the center of mass.
    #[inline]
    pub fn shifted_from_com(&self, mass: fph, displacement_from_com: &Vector3<fph>) -> Self {
        let (moment_of_inertia_deltas, product_of_inertia_deltas) =
            Self::compute_delta_from_com_moments_and_products_of_inertia(
                mass,
                displacement_from_com,
            );
        Self::from_moments_and_products(
            self.moments + moment_of_inertia_deltas,
            self.products + product_of_inertia_deltas,
        )
    }

    /// Computes the inertia tensor of a body with the given mass about the
    /// origin of the target pose and expressed in its axes, assuming this
    /// tensor is defined about the center of mass and expressed in the axes
    /// of the given center-of-mass pose. Both poses must be expressed in the
    /// same frame.
    ///
    /// The tensor is first rotated from the center-of-mass axes into the
    /// target axes, after which the parallel axis theorem accounts for the
    /// offset between the center of mass and the target origin.
    pub fn reframed(&self, mass: fph, center_of_mass_pose: &Pose, target_pose: &Pose) -> Self {
        let com_in_target = relative_pose(center_of_mass_pose, target_pose);
        self.rotated(&com_in_target.rotation)
            .shifted_from_com(mass, &com_in_target.translation.vector)
    }

    /// Checks that the tensor is positive semi-definite (to within
    /// [`PSD_TOLERANCE`]) and has only finite entries.
    ///
    /// # Errors
    /// Returns [`InertialError::InvalidInertia`] with the smallest eigenvalue
    /// (NaN if an entry is not finite) if the check fails.
    pub fn validate(&self) -> Result<()> {
        if !(self.moments.iter().chain(self.products.iter())).all(|entry| entry.is_finite()) {
            return Err(InertialError::InvalidInertia {
                smallest_eigenvalue: fph::NAN,
            });
        }

        let eigenvalues = self.matrix().symmetric_eigenvalues();
        let smallest_eigenvalue = eigenvalues.min();
        let scale = eigenvalues.amax().max(1.0);

        if smallest_eigenvalue < -PSD_TOLERANCE * scale {
            return Err(InertialError::InvalidInertia {
                smallest_eigenvalue,
            });
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn max_element(&self) -> fph {
        self.moments.amax().max(self.products.amax())
    }
}

impl Add for InertiaTensor {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_moments_and_products(self.moments + rhs.moments, self.products + rhs.products)
    }
}

impl AddAssign for InertiaTensor {
    fn add_assign(&mut self, rhs: Self) {
        self.moments += rhs.moments;
        self.products += rhs.products;
    }
}

impl Sum for InertiaTensor {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zeros(), Add::add)
    }
}

impl AbsDiffEq for InertiaTensor {
    type Epsilon = <fph as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        fph::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        InertiaVector::abs_diff_eq(&self.moments, &other.moments, epsilon)
            && InertiaVector::abs_diff_eq(&self.products, &other.products, epsilon)
    }
}

impl RelativeEq for InertiaTensor {
    fn default_max_relative() -> Self::Epsilon {
        fph::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        InertiaVector::relative_eq(&self.moments, &other.moments, epsilon, max_relative)
            && InertiaVector::relative_eq(&self.products, &other.products, epsilon, max_relative)
    }
}
