use crate::{info, scopes::ALL_SCOPES};

pub fn scopes() {
    for scope in ALL_SCOPES {
        info!("{}", scope);
    }
}
