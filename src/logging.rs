//! Logging shims.
//!
//! With the `log` feature these forward to the [`log`](https://docs.rs/log)
//! facade. Without it they expand to nothing but still type check their
//! arguments.
//!
//! The macros are defined with a `__` prefix and renamed on export, since a
//! bare `warn` conflicts with the builtin attribute of the same name.

macro_rules! __trace {
  ($($arg:tt)+) => {
    #[cfg(feature = "log")]
    {
      ::log::trace!($($arg)+);
    }
    #[cfg(not(feature = "log"))]
    {
      let _ = format_args!($($arg)+);
    }
  };
}
pub(crate) use __trace as trace;

macro_rules! __debug {
  ($($arg:tt)+) => {
    #[cfg(feature = "log")]
    {
      ::log::debug!($($arg)+);
    }
    #[cfg(not(feature = "log"))]
    {
      let _ = format_args!($($arg)+);
    }
  };
}
pub(crate) use __debug as debug;

macro_rules! __warn {
  ($($arg:tt)+) => {
    #[cfg(feature = "log")]
    {
      ::log::warn!($($arg)+);
    }
    #[cfg(not(feature = "log"))]
    {
      let _ = format_args!($($arg)+);
    }
  };
}
pub(crate) use __warn as warn;

macro_rules! __error {
  ($($arg:tt)+) => {
    #[cfg(feature = "log")]
    {
      ::log::error!($($arg)+);
    }
    #[cfg(not(feature = "log"))]
    {
      let _ = format_args!($($arg)+);
    }
  };
}
#[cfg_attr(not(feature = "std"), allow(unused_imports))]
pub(crate) use __error as error;

#[test]
fn test_log_macros_expand_anywhere() {
  let n = 3;
  trace!("trace {n}");
  debug!("debug {}", n + 1);
  warn!("warn {n:?}");
  error!("error {}", "x");
}
