//! Account commands: login, registration, profile, password reset.

#![allow(clippy::print_stdout)]

use secrecy::SecretString;
use wirecrest_storefront::backend::{
    ContactMessage, PasswordResetRequest, ProfileUpdate, RegisterRequest,
};
use wirecrest_storefront::services::AuthService;

use super::Context;
use crate::AccountAction;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub async fn run(action: AccountAction) -> CommandResult {
    let ctx = Context::load()?;
    let auth = AuthService::new(ctx.backend.clone(), ctx.storage.clone());

    match action {
        AccountAction::Login { email, password } => {
            let outcome = auth.login(&email, SecretString::from(password)).await?;
            println!("Logged in as {}.", outcome.user.display_name());
            if let Some(return_to) = outcome.return_to {
                println!("You were heading to: {return_to}");
            }
        }
        AccountAction::Logout => {
            auth.logout()?;
            println!("Logged out.");
        }
        AccountAction::Register {
            first_name,
            last_name,
            email,
            password,
        } => {
            let message = auth
                .register(&RegisterRequest {
                    first_name,
                    last_name,
                    email,
                    password,
                    role: "user",
                })
                .await?;
            println!("{message}");
        }
        AccountAction::Profile => {
            let Some(user) = auth.current_user() else {
                println!("Not logged in.");
                return Ok(());
            };
            let profile = auth.profile(user.id).await?;
            println!(
                "{} {} <{}>",
                profile.first_name.unwrap_or_default(),
                profile.last_name.unwrap_or_default(),
                profile.email.unwrap_or_default()
            );
            if let Some(phone) = profile.phone {
                println!("Phone: {phone}");
            }
        }
        AccountAction::UpdateProfile {
            first_name,
            last_name,
            password,
        } => {
            let Some(user) = auth.current_user() else {
                println!("Not logged in.");
                return Ok(());
            };
            let message = auth
                .update_profile(
                    user.id,
                    ProfileUpdate {
                        first_name,
                        last_name,
                        password,
                    },
                )
                .await?;
            println!("{message}");
        }
        AccountAction::RequestOtp { email } => {
            let message = auth
                .password_reset(&PasswordResetRequest::RequestOtp { email })
                .await?;
            println!("{message}");
        }
        AccountAction::VerifyOtp { email, otp } => {
            let message = auth
                .password_reset(&PasswordResetRequest::VerifyOtp { email, otp })
                .await?;
            println!("{message}");
        }
        AccountAction::ResetPassword {
            email,
            otp,
            password,
        } => {
            let message = auth
                .password_reset(&PasswordResetRequest::ResetPassword {
                    email,
                    otp,
                    password,
                })
                .await?;
            println!("{message}");
        }
        AccountAction::Subscribe { email } => {
            ctx.backend.subscribe_newsletter(&email).await?;
            println!("Subscribed {email}.");
        }
        AccountAction::Contact {
            name,
            email,
            phone,
            message,
        } => {
            ctx.backend
                .send_contact_message(&ContactMessage {
                    name,
                    email,
                    phone,
                    message,
                })
                .await?;
            println!("Message sent. We will get back to you soon.");
        }
    }
    Ok(())
}
