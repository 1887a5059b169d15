//! Synthetic user records for seeding.
//!
//! Usernames and emails come from the `fake` crate; the employee id is six
//! random alphanumeric characters and the role is drawn uniformly.

use crate::model::user::{NewUser, Role};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::Fake;
use rand::distr::Alphanumeric;
use rand::Rng;

pub const EMPLOYEE_ID_LEN: usize = 6;

pub trait UserGenerator: Send + Sync {
    fn generate(&self) -> NewUser;
}

/// Generator backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUserGenerator;

impl UserGenerator for RandomUserGenerator {
    fn generate(&self) -> NewUser {
        generate_user(&mut rand::rng())
    }
}

pub fn generate_user<R: Rng + ?Sized>(rng: &mut R) -> NewUser {
    let username: String = Username().fake_with_rng(rng);
    let employee_id: String = (0..EMPLOYEE_ID_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();
    let email: String = SafeEmail().fake_with_rng(rng);
    NewUser::new(username, employee_id, email, random_role(rng))
}

pub fn random_role<R: Rng + ?Sized>(rng: &mut R) -> Role {
    Role::ALL[rng.random_range(0..Role::ALL.len())]
}
