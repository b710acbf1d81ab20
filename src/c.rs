// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::*;

use std::ffi::{c_char, CStr, CString, OsStr};
use std::mem::forget;
use std::os::unix::ffi::OsStrExt;
use std::ptr::null_mut;

#[unsafe(no_mangle)]
pub unsafe extern "C" fn floorpath_repository_new() -> *mut Repository {
    Box::into_raw(Box::<Repository>::default())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn floorpath_repository_delete(ptr: *mut Repository) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn floorpath_repository_len(repo: *const Repository) -> usize {
    repo.as_ref().map(|r| r.len()).unwrap_or(0)
}

#[derive(Copy, Clone)]
#[repr(C)]
pub enum CGridFormat {
    Unknown = 0,
    Npy = 1,
    NpyGz = 2,
    NpyBz2 = 3,
}

impl From<CGridFormat> for map::GridFormat {
    fn from(value: CGridFormat) -> Self {
        match value {
            CGridFormat::Unknown => map::GridFormat::Unknown,
            CGridFormat::Npy => map::GridFormat::Npy,
            CGridFormat::NpyGz => map::GridFormat::NpyGz,
            CGridFormat::NpyBz2 => map::GridFormat::NpyBz2,
        }
    }
}

#[repr(C)]
pub struct COptions {
    pub grid_format: CGridFormat,
    pub with_connections: bool,
}

/// Loads a building into the repository. A NULL `c_options` means default options.
/// Returns false (and logs the reason) if the building couldn't be loaded.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn floorpath_repository_load_building(
    repo: *mut Repository,
    c_options: *const COptions,
    c_base_dir: *const c_char,
    c_code: *const c_char,
) -> bool {
    let repo = match repo.as_mut() {
        Some(r) => r,
        None => return false,
    };
    if c_base_dir.is_null() || c_code.is_null() {
        return false;
    }

    let base_dir = OsStr::from_bytes(CStr::from_ptr(c_base_dir).to_bytes());
    let code = match CStr::from_ptr(c_code).to_str() {
        Ok(code) => code,
        Err(_) => return false,
    };

    let (options, with_connections) = match c_options.as_ref() {
        Some(c) => (
            map::Options {
                grid_format: c.grid_format.into(),
            },
            c.with_connections,
        ),
        None => (map::Options::default(), false),
    };

    let result = if with_connections {
        map::load_with_connections(repo, &options, base_dir, &[code])
    } else {
        map::add_building_from_dir(repo, &options, base_dir, code)
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            log::error!("failed to load building {}: {}", code, e);
            false
        }
    }
}

#[repr(C)]
pub struct CWaypoint {
    /// Owned, NUL-terminated building code. Freed by [floorpath_route_result_delete].
    pub building: *mut c_char,
    pub floor: i32,
    pub row: i32,
    pub col: i32,
}

impl From<&Position> for CWaypoint {
    fn from(p: &Position) -> Self {
        CWaypoint {
            building: CString::new(p.building.as_bytes())
                .map(CString::into_raw)
                .unwrap_or(null_mut()),
            floor: p.floor,
            row: p.row,
            col: p.col,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum CRouteResultType {
    Ok = 0,
    UnresolvedLocation = 1,
    BuildingDataUnavailable = 2,
    NoFreeCell = 3,
    NoPathFound = 4,
    StepLimitExceeded = 5,
    InvalidArgument = 6,
}

impl From<&RouteError> for CRouteResultType {
    fn from(e: &RouteError) -> Self {
        match e {
            RouteError::UnresolvedLocation { .. } => CRouteResultType::UnresolvedLocation,
            RouteError::BuildingDataUnavailable(_) => CRouteResultType::BuildingDataUnavailable,
            RouteError::NoFreeCell(_) => CRouteResultType::NoFreeCell,
            RouteError::NoPathFound => CRouteResultType::NoPathFound,
            RouteError::StepLimitExceeded => CRouteResultType::StepLimitExceeded,
        }
    }
}

#[repr(C)]
pub struct CRouteResult {
    pub waypoints: *mut CWaypoint,
    pub len: usize,
    pub capacity: usize,
    pub type_: CRouteResultType,
}

impl CRouteResult {
    fn ok(positions: &[Position]) -> Self {
        let mut waypoints: Vec<CWaypoint> = positions.iter().map(CWaypoint::from).collect();
        let ptr = waypoints.as_mut_ptr();
        let len = waypoints.len();
        let capacity = waypoints.capacity();
        forget(waypoints);

        CRouteResult {
            waypoints: ptr,
            len,
            capacity,
            type_: CRouteResultType::Ok,
        }
    }

    fn err(type_: CRouteResultType) -> Self {
        CRouteResult {
            waypoints: null_mut(),
            len: 0,
            capacity: 0,
            type_,
        }
    }
}

unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        None
    } else {
        CStr::from_ptr(ptr).to_str().ok()
    }
}

/// Finds a route between two (building, location) pairs, returning the simplified
/// waypoints, or the raw cell-by-cell path if `raw` is set.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn floorpath_find_route(
    repo: *const Repository,
    c_start_building: *const c_char,
    c_start_location: *const c_char,
    c_goal_building: *const c_char,
    c_goal_location: *const c_char,
    step_limit: usize,
    raw: bool,
) -> CRouteResult {
    let args = (
        repo.as_ref(),
        str_arg(c_start_building),
        str_arg(c_start_location),
        str_arg(c_goal_building),
        str_arg(c_goal_location),
    );

    if let (Some(repo), Some(sb), Some(sl), Some(gb), Some(gl)) = args {
        match find_route(repo, (sb, sl), (gb, gl), step_limit) {
            Ok(route) if raw => CRouteResult::ok(&route.raw),
            Ok(route) => CRouteResult::ok(&route.waypoints),
            Err(e) => CRouteResult::err((&e).into()),
        }
    } else {
        CRouteResult::err(CRouteResultType::InvalidArgument)
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn floorpath_route_result_delete(result: CRouteResult) {
    if result.waypoints.is_null() {
        return;
    }

    let waypoints = Vec::from_raw_parts(result.waypoints, result.len, result.capacity);
    for waypoint in waypoints {
        if !waypoint.building.is_null() {
            drop(CString::from_raw(waypoint.building));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{building, open_floor, repository};

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    #[test]
    fn find_route_smoke() {
        let mut b = building("ne01", &[(1, open_floor(4).as_str())]);
        b.add_room(101, 1, 0, 0);
        b.add_room(102, 1, 3, 3);
        let repo = Box::into_raw(Box::new(repository([b])));

        let (ne01, r101, r102, r999) = (c("ne01"), c("101"), c("102"), c("999"));

        unsafe {
            assert_eq!(floorpath_repository_len(repo), 1);

            let result = floorpath_find_route(
                repo,
                ne01.as_ptr(),
                r101.as_ptr(),
                ne01.as_ptr(),
                r102.as_ptr(),
                DEFAULT_STEP_LIMIT,
                false,
            );
            assert_eq!(result.type_, CRouteResultType::Ok);
            assert_eq!(result.len, 2);

            let waypoints = std::slice::from_raw_parts(result.waypoints, result.len);
            assert_eq!(CStr::from_ptr(waypoints[0].building).to_str(), Ok("ne01"));
            assert_eq!((waypoints[0].floor, waypoints[0].row, waypoints[0].col), (1, 0, 0));
            assert_eq!((waypoints[1].floor, waypoints[1].row, waypoints[1].col), (1, 3, 3));
            floorpath_route_result_delete(result);

            let result = floorpath_find_route(
                repo,
                ne01.as_ptr(),
                r101.as_ptr(),
                ne01.as_ptr(),
                r102.as_ptr(),
                DEFAULT_STEP_LIMIT,
                true,
            );
            assert_eq!(result.type_, CRouteResultType::Ok);
            assert_eq!(result.len, 7);
            floorpath_route_result_delete(result);

            let result = floorpath_find_route(
                repo,
                ne01.as_ptr(),
                r999.as_ptr(),
                ne01.as_ptr(),
                r102.as_ptr(),
                DEFAULT_STEP_LIMIT,
                false,
            );
            assert_eq!(result.type_, CRouteResultType::UnresolvedLocation);
            assert!(result.waypoints.is_null());
            floorpath_route_result_delete(result);

            let result = floorpath_find_route(
                repo,
                std::ptr::null(),
                r101.as_ptr(),
                ne01.as_ptr(),
                r102.as_ptr(),
                DEFAULT_STEP_LIMIT,
                false,
            );
            assert_eq!(result.type_, CRouteResultType::InvalidArgument);

            floorpath_repository_delete(repo);
        }
    }

    #[test]
    fn load_building_failures() {
        let dir = tempfile::tempdir().unwrap();
        let base = c(dir.path().to_str().unwrap());
        let code = c("sw99");

        unsafe {
            let repo = floorpath_repository_new();
            assert!(!floorpath_repository_load_building(
                repo,
                std::ptr::null(),
                base.as_ptr(),
                code.as_ptr(),
            ));
            assert!(!floorpath_repository_load_building(
                repo,
                std::ptr::null(),
                std::ptr::null(),
                code.as_ptr(),
            ));
            assert_eq!(floorpath_repository_len(repo), 0);
            floorpath_repository_delete(repo);
        }
    }
}
