#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # mkinclude-gmk
//!
//! GNU make loadable object exposing the mkinclude functions.
//!
//! ```make
//! load ./libmkinclude_gmk.so(mkinclude_gmk_gmk_setup)
//!
//! $(include-once common.mk)
//! $(include-subsystem lib/lib.mk)
//! SOURCES := $(from-here main.c util.c)
//! ```
//!
//! The functions registered are `include-once` and `include-once-debug`
//! (one or more arguments), `from-here` and `include-subsystem` (exactly
//! one argument). Configuration is read once per make process from the
//! `MKINCLUDE_*` environment, see [`mkinclude::config`].

use std::ffi::{c_char, c_int, c_uint, CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::ptr;

use mkinclude::host::{Evaluator, Location, MakeVariables};
use mkinclude::{Error, Includer, Logger, Result};

/// Tells make that this object may be loaded.
#[no_mangle]
#[allow(non_upper_case_globals)]
pub static plugin_is_GPL_compatible: c_int = 0;

/// `gmk_floc` from `gnumake.h`.
#[repr(C)]
struct GmkFloc {
    filenm: *const c_char,
    lineno: std::ffi::c_ulong,
}

type GmkFunc = unsafe extern "C" fn(*const c_char, c_uint, *mut *mut c_char) -> *mut c_char;

const GMK_FUNC_DEFAULT: c_uint = 0;

extern "C" {
    fn gmk_free(str: *mut c_char);
    fn gmk_alloc(len: c_uint) -> *mut c_char;
    fn gmk_eval(buffer: *const c_char, floc: *const GmkFloc);
    fn gmk_expand(str: *const c_char) -> *mut c_char;
    fn gmk_add_function(
        name: *const c_char,
        func: GmkFunc,
        min_args: c_uint,
        max_args: c_uint,
        flags: c_uint,
    );
}

thread_local! {
    static INCLUDER: Includer = load_includer();
}

fn load_includer() -> Includer {
    match Includer::from_env() {
        Ok(includer) => includer,
        Err(e) => {
            Logger::default().error(&format!("mkinclude: {e}; using defaults"));
            Includer::default()
        }
    }
}

/// The running make, reached through the loadable-object API.
struct GnuMake;

fn c_string(text: &str) -> Result<CString> {
    CString::new(text).map_err(|_| Error::HostEvaluation {
        statement: text.to_string(),
        reason: "text contains a NUL byte".to_string(),
    })
}

impl Evaluator for GnuMake {
    fn expand(&mut self, text: &str) -> Result<String> {
        let input = c_string(text)?;
        // SAFETY: `input` is a valid NUL-terminated string for the duration
        // of the call; make returns either NULL or a string it allocated.
        let output = unsafe { gmk_expand(input.as_ptr()) };
        if output.is_null() {
            return Err(Error::HostEvaluation {
                statement: text.to_string(),
                reason: "expansion returned nothing".to_string(),
            });
        }
        // SAFETY: `output` is non-null and NUL-terminated; it is released
        // with `gmk_free` exactly once, after being copied.
        let expanded = unsafe {
            let copy = CStr::from_ptr(output).to_string_lossy().into_owned();
            gmk_free(output);
            copy
        };
        Ok(expanded)
    }

    fn evaluate(&mut self, statement: &str, location: &Location) -> Result<()> {
        let buffer = c_string(statement)?;
        let file = c_string(location.file())?;
        let floc = GmkFloc {
            filenm: file.as_ptr(),
            lineno: std::ffi::c_ulong::try_from(location.line()).unwrap_or(0),
        };
        log::debug!("eval at {location}: {statement}");
        // SAFETY: both strings outlive the call; make does not keep `floc`.
        unsafe { gmk_eval(buffer.as_ptr(), &floc) };
        Ok(())
    }

    fn working_dir(&mut self) -> Result<PathBuf> {
        let curdir = self.expand("$(CURDIR)")?;
        if curdir.is_empty() {
            return Err(Error::Resolution {
                path: "$(CURDIR)".to_string(),
                reason: "CURDIR is empty".to_string(),
            });
        }
        Ok(PathBuf::from(curdir))
    }
}

/// Copy make's argument vector.
///
/// # Safety
///
/// `argv` must point to `argc` valid NUL-terminated strings.
unsafe fn arguments(argc: c_uint, argv: *mut *mut c_char) -> Vec<String> {
    (0..argc as usize)
        .map(|i| {
            let arg = *argv.add(i);
            if arg.is_null() {
                String::new()
            } else {
                CStr::from_ptr(arg).to_string_lossy().into_owned()
            }
        })
        .collect()
}

/// Hand `text` back to make in memory it can free.
fn to_make_string(text: &str) -> *mut c_char {
    if text.is_empty() {
        return ptr::null_mut();
    }
    let Ok(len) = c_uint::try_from(text.len() + 1) else {
        return ptr::null_mut();
    };
    // SAFETY: gmk_alloc returns `len` writable bytes or NULL; we write
    // `text.len()` bytes plus the terminator.
    unsafe {
        let buffer = gmk_alloc(len);
        if buffer.is_null() {
            return ptr::null_mut();
        }
        ptr::copy_nonoverlapping(text.as_ptr().cast::<c_char>(), buffer, text.len());
        *buffer.add(text.len()) = 0;
        buffer
    }
}

/// Run `f` with the thread's includer and a make host, keeping panics and
/// errors on this side of the C boundary.
fn with_host<T: Default>(
    function: &str,
    f: impl FnOnce(&Includer, &mut MakeVariables<GnuMake>) -> Result<T>,
) -> T {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        INCLUDER.with(|includer| {
            let mut host = MakeVariables::new(GnuMake);
            f(includer, &mut host)
        })
    }));

    match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            Logger::default().error(&format!("{function}: {e}"));
            T::default()
        }
        Err(_) => {
            Logger::default().error(&format!("{function}: internal error"));
            T::default()
        }
    }
}

unsafe extern "C" fn include_once(
    _name: *const c_char,
    argc: c_uint,
    argv: *mut *mut c_char,
) -> *mut c_char {
    let args = arguments(argc, argv);
    with_host("include-once", |includer, host| includer.include_once(host, args.as_slice()));
    ptr::null_mut()
}

unsafe extern "C" fn include_once_debug(
    _name: *const c_char,
    argc: c_uint,
    argv: *mut *mut c_char,
) -> *mut c_char {
    let args = arguments(argc, argv);
    with_host("include-once-debug", |includer, host| {
        includer.include_once_debug(host, args.as_slice())
    });
    ptr::null_mut()
}

unsafe extern "C" fn from_here(
    _name: *const c_char,
    argc: c_uint,
    argv: *mut *mut c_char,
) -> *mut c_char {
    let args = arguments(argc, argv);
    let list = args.first().map_or("", String::as_str);
    let text = with_host("from-here", |includer, host| includer.from_here_text(host, list));
    to_make_string(&text)
}

unsafe extern "C" fn include_subsystem(
    _name: *const c_char,
    argc: c_uint,
    argv: *mut *mut c_char,
) -> *mut c_char {
    let args = arguments(argc, argv);
    let file = args.first().map_or("", String::as_str);
    with_host("include-subsystem", |includer, host| {
        includer.include_subsystem(host, file)
    });
    ptr::null_mut()
}

/// Entry point called by make's `load` directive.
///
/// # Safety
///
/// Must only be called by GNU make, which provides the `gmk_*` symbols.
#[no_mangle]
pub unsafe extern "C" fn mkinclude_gmk_gmk_setup(_floc: *const std::ffi::c_void) -> c_int {
    let functions: [(&CStr, GmkFunc, c_uint, c_uint); 4] = [
        (c"include-once", include_once, 1, 0),
        (c"include-once-debug", include_once_debug, 1, 0),
        (c"from-here", from_here, 1, 1),
        (c"include-subsystem", include_subsystem, 1, 1),
    ];

    for (name, func, min_args, max_args) in functions {
        gmk_add_function(name.as_ptr(), func, min_args, max_args, GMK_FUNC_DEFAULT);
    }
    1
}
