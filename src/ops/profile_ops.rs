use crate::io::store::{KEY_PROFILE, KEY_THEME, Store};
use crate::model::{Profile, ThemePref};
use crate::ops::{OpsError, required};

pub fn load_profile(store: &Store) -> Profile {
    store.get_one(KEY_PROFILE).unwrap_or_default()
}

/// Save the profile. Both fields are required and the email needs an `@`
/// with text on either side.
pub fn save_profile(store: &Store, full_name: &str, email: &str) -> Result<Profile, OpsError> {
    let full_name = required(full_name, "name")?;
    let email = required(email, "email")?;
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => {}
        _ => return Err(OpsError::InvalidEmail(email.to_string())),
    }
    let profile = Profile {
        full_name: full_name.to_string(),
        email: email.to_string(),
    };
    store.put_one(KEY_PROFILE, &profile)?;
    Ok(profile)
}

pub fn load_theme(store: &Store) -> ThemePref {
    store.get_one(KEY_THEME).unwrap_or_default()
}

pub fn save_theme(store: &Store, theme: ThemePref) -> Result<(), OpsError> {
    store.put_one(KEY_THEME, &theme)?;
    Ok(())
}
