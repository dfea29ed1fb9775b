//! Stateless utility calculators behind the student and teacher mini-apps
pub mod aggregate;
pub mod password;
pub mod qr;
pub mod timetable;
pub mod unit_converter;
pub mod wellness;

pub use aggregate::{attendance_sheet, student_progress, todo_summary, AttendanceSheet, AttendanceSummary};
pub use password::{CharClasses, StrengthLabel};
pub use qr::QrPayload;
pub use timetable::{build_grid, grid_window, GridWindow, TimetableGrid};
pub use unit_converter::{Category, ConversionError};
pub use wellness::TipCategory;
