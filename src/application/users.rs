//! User roster collaborator backing the `/users` route group.
//!
//! Deliberately thin: the scaffold only promises prefix delegation, so the
//! directory serves a fixed seed roster and nothing else.

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: u32,
    pub name: String,
    pub handle: String,
}

#[derive(Debug)]
pub struct UserDirectory {
    users: Vec<UserRecord>,
}

impl UserDirectory {
    pub fn seeded() -> Self {
        let users = vec![
            UserRecord {
                id: 1,
                name: "Ada Lovelace".to_string(),
                handle: "ada".to_string(),
            },
            UserRecord {
                id: 2,
                name: "Grace Hopper".to_string(),
                handle: "grace".to_string(),
            },
            UserRecord {
                id: 3,
                name: "Hedy Lamarr".to_string(),
                handle: "hedy".to_string(),
            },
        ];
        Self { users }
    }

    pub fn list(&self) -> &[UserRecord] {
        &self.users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_roster_is_stable() {
        let directory = UserDirectory::seeded();
        let handles: Vec<&str> = directory.list().iter().map(|u| u.handle.as_str()).collect();
        assert_eq!(handles, vec!["ada", "grace", "hedy"]);
    }
}
