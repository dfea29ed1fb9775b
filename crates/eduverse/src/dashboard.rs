//! Role-based tool lists for the dashboard shell
use serde::Serialize;

use crate::store::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Chat,
    Todo,
    Notes,
    Calculator,
    Timer,
    QrGenerator,
    UnitConverter,
    PasswordGenerator,
    Wellness,
    ClassManager,
    Attendance,
    LessonPlanner,
    Timetable,
    ProgressTracker,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToolEntry {
    pub id: Tool,
    pub name: &'static str,
    pub path: &'static str,
}

const fn entry(id: Tool, name: &'static str, path: &'static str) -> ToolEntry {
    ToolEntry { id, name, path }
}

const SHARED: &[ToolEntry] = &[
    entry(Tool::Chat, "Study Assistant", "/chat"),
    entry(Tool::Todo, "To-Do List", "/todo"),
    entry(Tool::Notes, "Notes", "/notes"),
    entry(Tool::Calculator, "Calculator", "/calculator"),
    entry(Tool::Timer, "Timer", "/timer"),
    entry(Tool::QrGenerator, "QR Generator", "/qr"),
    entry(Tool::UnitConverter, "Unit Converter", "/unit-converter"),
    entry(Tool::PasswordGenerator, "Password Generator", "/password-generator"),
];

const STUDENT_ONLY: &[ToolEntry] = &[entry(Tool::Wellness, "Wellness Tips", "/wellness")];

const TEACHER_ONLY: &[ToolEntry] = &[
    entry(Tool::ClassManager, "Class Manager", "/classes"),
    entry(Tool::Attendance, "Attendance", "/attendance"),
    entry(Tool::LessonPlanner, "Lesson Planner", "/lesson-plans"),
    entry(Tool::Timetable, "Timetable", "/timetable"),
    entry(Tool::ProgressTracker, "Progress Tracker", "/progress"),
];

pub fn tools_for(role: Role) -> Vec<ToolEntry> {
    let extra = match role {
        Role::Student => STUDENT_ONLY,
        Role::Teacher => TEACHER_ONLY,
    };
    SHARED.iter().chain(extra).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(role: Role) -> Vec<Tool> {
        tools_for(role).into_iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_student_tools() {
        let tools = ids(Role::Student);
        assert!(tools.contains(&Tool::Wellness));
        assert!(tools.contains(&Tool::Chat));
        assert!(!tools.contains(&Tool::Attendance));
    }

    #[test]
    fn test_teacher_tools() {
        let tools = ids(Role::Teacher);
        for tool in [Tool::ClassManager, Tool::Attendance, Tool::LessonPlanner, Tool::Timetable, Tool::ProgressTracker] {
            assert!(tools.contains(&tool), "{:?} missing", tool);
        }
        assert!(!tools.contains(&Tool::Wellness));
        assert!(tools.contains(&Tool::UnitConverter));
    }
}
