use crate::store::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ShowRanking,
    ShowResults,
    RegisterResult,
    Exit,
}

const TEACHER_MENU: &[(&str, &str, Action)] = &[
    ("1", "show students rank", Action::ShowRanking),
    ("2", "show student points", Action::ShowResults),
    ("3", "register points", Action::RegisterResult),
    ("4", "exit", Action::Exit),
];

const PARENT_MENU: &[(&str, &str, Action)] = &[
    ("1", "show student points", Action::ShowResults),
    ("2", "exit", Action::Exit),
];

pub fn entries(role: Role) -> &'static [(&'static str, &'static str, Action)] {
    match role {
        Role::Teacher => TEACHER_MENU,
        Role::Parent => PARENT_MENU,
    }
}

/// The action bound to `choice` in `role`'s menu, if any.
pub fn parse(role: Role, choice: &str) -> Option<Action> {
    let choice = choice.trim();
    entries(role)
        .iter()
        .find(|(key, _, _)| *key == choice)
        .map(|(_, _, action)| *action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teacher_menu_numbers() {
        assert_eq!(parse(Role::Teacher, "1"), Some(Action::ShowRanking));
        assert_eq!(parse(Role::Teacher, " 3\n"), Some(Action::RegisterResult));
        assert_eq!(parse(Role::Teacher, "4"), Some(Action::Exit));
        assert_eq!(parse(Role::Teacher, "5"), None);
    }

    #[test]
    fn parent_cannot_reach_teacher_actions() {
        assert_eq!(parse(Role::Parent, "1"), Some(Action::ShowResults));
        assert_eq!(parse(Role::Parent, "2"), Some(Action::Exit));
        assert_eq!(parse(Role::Parent, "3"), None);
        assert!(entries(Role::Parent)
            .iter()
            .all(|(_, _, a)| !matches!(a, Action::ShowRanking | Action::RegisterResult)));
    }
}
