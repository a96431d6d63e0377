//! Manual FFI bindings for the dh_kinematics library
//!
//! This module provides a C-compatible interface to a [`ManipulatorChain`].
//! C and C++ callers hold an opaque handle, drive joint variables through it
//! and read back transforms, joint positions and Jacobians.
//!
//! The approach uses:
//! - `#[no_mangle]` functions with C calling convention
//! - Opaque pointer types for safe memory management
//! - Column-major `double` buffers (compatible with Eigen)
//! - Box allocation/deallocation patterns

use dh_kinematics::{
    DhGeometry, JointLink, JointType, ManipulatorChain, Matrix4, jacobian, transform,
};
use std::ffi::{CString, c_char, c_double, c_uint};
use std::ptr;

/// Joint type tag for revolute links in `dh_chain_new`
pub const DH_JOINT_REVOLUTE: c_uint = 0;
/// Joint type tag for prismatic links in `dh_chain_new`
pub const DH_JOINT_PRISMATIC: c_uint = 1;

/// Opaque handle to a Rust ManipulatorChain object
pub struct DhChainHandle {
    chain: ManipulatorChain,
}

/// C-compatible representation of a 4x4 transformation matrix
/// Data is stored in column-major order (compatible with Eigen)
#[repr(C)]
pub struct Mat4d {
    pub data: [c_double; 16],
}

impl Mat4d {
    fn identity() -> Self {
        Self::from_matrix(&Matrix4::identity())
    }

    fn from_matrix(matrix: &Matrix4<f64>) -> Self {
        Self {
            data: transform::to_column_major(matrix),
        }
    }

    fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::from_column_slice(&self.data)
    }
}

/// Create a chain from per-link joint types and DH constants
///
/// `joint_types` holds `count` tags (`DH_JOINT_REVOLUTE` or
/// `DH_JOINT_PRISMATIC`); `geometry` holds `4 * count` doubles, one
/// `theta, d, a, alpha` group per link.
///
/// # Safety
/// The returned pointer must be freed using `dh_chain_free`.
/// Both arrays must be valid for the stated number of elements.
/// Returns null on null input, an unknown tag, non-finite geometry or `count == 0`.
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_new(
    joint_types: *const c_uint,
    geometry: *const c_double,
    count: c_uint,
) -> *mut DhChainHandle {
    if joint_types.is_null() || geometry.is_null() || count == 0 {
        return ptr::null_mut();
    }

    let count = count as usize;
    let types = unsafe { std::slice::from_raw_parts(joint_types, count) };
    let constants = unsafe { std::slice::from_raw_parts(geometry, count * 4) };

    let mut links = Vec::with_capacity(count);
    for (&tag, row) in types.iter().zip(constants.chunks_exact(4)) {
        let joint_type = match tag {
            DH_JOINT_REVOLUTE => JointType::Revolute,
            DH_JOINT_PRISMATIC => JointType::Prismatic,
            _ => return ptr::null_mut(),
        };
        match DhGeometry::from_slice(row).and_then(|g| JointLink::new(joint_type, g)) {
            Ok(link) => links.push(link),
            Err(_) => return ptr::null_mut(),
        }
    }

    match ManipulatorChain::new(links) {
        Ok(chain) => Box::into_raw(Box::new(DhChainHandle { chain })),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a chain handle
///
/// # Safety
/// The chain pointer must be a valid pointer returned from `dh_chain_new`
/// and must not be used after this call
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_free(chain: *mut DhChainHandle) {
    if !chain.is_null() {
        unsafe {
            drop(Box::from_raw(chain));
        }
    }
}

/// Get the number of joints in a chain
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_dof(chain: *const DhChainHandle) -> c_uint {
    if chain.is_null() {
        return 0;
    }

    let handle = unsafe { &*chain };
    handle.chain.dof() as c_uint
}

/// Set the world to base transform (column-major)
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_set_base(chain: *mut DhChainHandle, base: Mat4d) -> bool {
    if chain.is_null() || base.data.iter().any(|v| !v.is_finite()) {
        return false;
    }

    let handle = unsafe { &mut *chain };
    handle.chain.set_base(base.to_matrix());
    true
}

/// Set the limits of one joint; returns false on a bad index or invalid limits
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_set_limits(
    chain: *mut DhChainHandle,
    index: c_uint,
    min_limit: c_double,
    max_limit: c_double,
) -> bool {
    if chain.is_null() {
        return false;
    }

    let handle = unsafe { &mut *chain };
    match handle.chain.link_mut(index as usize) {
        Some(link) => link.set_limits(min_limit, max_limit).is_ok(),
        None => false,
    }
}

/// Set one joint variable; the value is saturated to the joint limits
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_set_joint_variable(
    chain: *mut DhChainHandle,
    index: c_uint,
    value: c_double,
) -> bool {
    if chain.is_null() {
        return false;
    }

    let handle = unsafe { &mut *chain };
    handle
        .chain
        .set_joint_variable(index as usize, value)
        .is_ok()
}

/// Get one joint variable, NaN for a null chain or bad index
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_get_joint_variable(
    chain: *const DhChainHandle,
    index: c_uint,
) -> c_double {
    if chain.is_null() {
        return f64::NAN;
    }

    let handle = unsafe { &*chain };
    handle
        .chain
        .link(index as usize)
        .map_or(f64::NAN, JointLink::joint_variable)
}

/// End-effector pose in base coordinates, identity for a null chain
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_tool_transform(chain: *const DhChainHandle) -> Mat4d {
    if chain.is_null() {
        return Mat4d::identity();
    }

    let handle = unsafe { &*chain };
    Mat4d::from_matrix(&transform::tool_transform(&handle.chain))
}

/// End-effector pose in world coordinates, identity for a null chain
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_world_tool_transform(chain: *const DhChainHandle) -> Mat4d {
    if chain.is_null() {
        return Mat4d::identity();
    }

    let handle = unsafe { &*chain };
    Mat4d::from_matrix(&transform::world_tool_transform(&handle.chain))
}

/// Copy `values` into a caller buffer of `capacity` doubles
///
/// Returns false without writing when the buffer is null or too small.
fn write_buffer(values: &[f64], out: *mut c_double, capacity: c_uint) -> bool {
    if out.is_null() || (capacity as usize) < values.len() {
        return false;
    }
    let buffer = unsafe { std::slice::from_raw_parts_mut(out, values.len()) };
    buffer.copy_from_slice(values);
    true
}

/// Write every cumulative base-frame transform, 16 doubles each
///
/// # Safety
/// `out` must point to at least `capacity` doubles.
/// Returns the number of transforms written, 0 if `capacity < 16 * dof`.
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_base_transforms(
    chain: *const DhChainHandle,
    out: *mut c_double,
    capacity: c_uint,
) -> c_uint {
    if chain.is_null() {
        return 0;
    }

    let handle = unsafe { &*chain };
    let cumulative = transform::base_transforms(&transform::local_transforms(&handle.chain));
    let values: Vec<f64> = cumulative
        .iter()
        .flat_map(transform::to_column_major)
        .collect();

    if write_buffer(&values, out, capacity) {
        cumulative.len() as c_uint
    } else {
        0
    }
}

/// Write the 3xN joint position matrix, column-major
///
/// # Safety
/// `out` must point to at least `capacity` doubles.
/// Returns the number of columns written, 0 if `capacity < 3 * dof`.
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_joint_positions(
    chain: *const DhChainHandle,
    out: *mut c_double,
    capacity: c_uint,
) -> c_uint {
    if chain.is_null() {
        return 0;
    }

    let handle = unsafe { &*chain };
    let positions = transform::joint_positions(&handle.chain);
    if write_buffer(positions.as_slice(), out, capacity) {
        positions.ncols() as c_uint
    } else {
        0
    }
}

/// Write the 6xN Jacobian, column-major
///
/// # Safety
/// `out` must point to at least `capacity` doubles.
/// Returns the number of columns written, 0 if `capacity < 6 * dof`.
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_jacobian(
    chain: *const DhChainHandle,
    out: *mut c_double,
    capacity: c_uint,
) -> c_uint {
    if chain.is_null() {
        return 0;
    }

    let handle = unsafe { &*chain };
    let jacobian = jacobian(&handle.chain);
    if write_buffer(jacobian.as_slice(), out, capacity) {
        jacobian.ncols() as c_uint
    } else {
        0
    }
}

/// Get a human readable summary of the chain
///
/// # Safety
/// The returned string must be freed with `dh_string_free`
#[unsafe(no_mangle)]
pub extern "C" fn dh_chain_describe(chain: *const DhChainHandle) -> *mut c_char {
    if chain.is_null() {
        return ptr::null_mut();
    }

    let handle = unsafe { &*chain };
    match CString::new(handle.chain.to_string()) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a string returned by `dh_chain_describe`
///
/// # Safety
/// The string pointer must be a valid pointer returned from `dh_chain_describe`
#[unsafe(no_mangle)]
pub extern "C" fn dh_string_free(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            drop(CString::from_raw(s));
        }
    }
}
