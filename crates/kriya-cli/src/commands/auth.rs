//! Authentication commands driving the flow controller.

use crate::prompt;
use crate::App;
use kriya_auth::{
    FirstStep, FlowController, FlowProgress, FlowStep, PasswordUpgrade, Redirect, UpgradeOutcome,
};
use tracing::debug;

fn flow(app: &App, first: FirstStep) -> FlowController {
    FlowController::new(app.gateway.clone(), app.store.clone(), first)
}

fn show_message(ctl: &FlowController) {
    if let Some(message) = ctl.message() {
        println!("{message}");
    }
}

fn arrived(redirect: Redirect) {
    println!("Signed in. Continue at {}", redirect.location);
}

/// `kriya login`: email/password sign-in, or a federated exchange when a
/// provider credential is supplied.
pub async fn login(app: &App, google_credential: Option<&str>) -> anyhow::Result<()> {
    let mut ctl = flow(app, FirstStep::SignIn);

    if let Some(credential) = google_credential {
        match ctl.submit_federated(credential).await? {
            FlowProgress::Authenticated(redirect) => arrived(redirect),
            FlowProgress::Blocked(reason) => println!("{reason}"),
            _ => show_message(&ctl),
        }
        return Ok(());
    }

    loop {
        let Some(email) = prompt::required("Email")? else {
            return Ok(());
        };
        let Some(password) = prompt::required("Password")? else {
            return Ok(());
        };

        let draft = ctl.draft_mut();
        draft.email = email;
        draft.password = password;

        match ctl.submit_sign_in().await? {
            FlowProgress::Authenticated(redirect) => {
                arrived(redirect);
                return Ok(());
            }
            FlowProgress::Blocked(reason) => println!("{reason}"),
            progress => {
                debug!(?progress, "Sign-in attempt did not authenticate");
                show_message(&ctl);
            }
        }
    }
}

/// `kriya signup`: account creation with OTP email verification.
pub async fn signup(app: &App) -> anyhow::Result<()> {
    let mut ctl = flow(app, FirstStep::SignUp);

    loop {
        match ctl.step() {
            FlowStep::SignUp => {
                let Some(email) = prompt::required("Email")? else {
                    return Ok(());
                };
                let Some(password) = prompt::required("Password")? else {
                    return Ok(());
                };
                let Some(confirm) = prompt::required("Confirm password")? else {
                    return Ok(());
                };

                let draft = ctl.draft_mut();
                draft.email = email;
                draft.password = password;
                draft.confirm_password = confirm;

                match ctl.submit_sign_up().await? {
                    FlowProgress::Advanced => println!("OTP sent to your email"),
                    FlowProgress::Blocked(reason) => println!("{reason}"),
                    _ => show_message(&ctl),
                }
            }
            FlowStep::OtpSignUp => {
                let Some(otp) = prompt::required("6-digit code (empty to go back)")? else {
                    ctl.go_back()?;
                    continue;
                };
                ctl.draft_mut().otp = otp;

                match ctl.submit_sign_up_otp().await? {
                    FlowProgress::Authenticated(redirect) => {
                        arrived(redirect);
                        return Ok(());
                    }
                    FlowProgress::Blocked(reason) => println!("{reason}"),
                    _ => show_message(&ctl),
                }
            }
            _ => return Ok(()),
        }
    }
}

/// `kriya reset-password`: forgotten-password recovery with OTP.
pub async fn reset_password(app: &App) -> anyhow::Result<()> {
    let mut ctl = flow(app, FirstStep::SignIn);
    ctl.go_to_forgot_password()?;

    loop {
        match ctl.step() {
            FlowStep::ForgotPassword => {
                let Some(email) = prompt::required("Email")? else {
                    return Ok(());
                };
                ctl.draft_mut().email = email;

                match ctl.submit_forgot_password().await? {
                    FlowProgress::Advanced => println!("OTP sent to your email"),
                    FlowProgress::Blocked(reason) => println!("{reason}"),
                    _ => show_message(&ctl),
                }
            }
            FlowStep::OtpReset => {
                let Some(otp) = prompt::required("6-digit code (empty to go back)")? else {
                    ctl.go_back()?;
                    continue;
                };
                ctl.draft_mut().otp = otp;

                match ctl.submit_reset_otp().await? {
                    FlowProgress::Advanced => {}
                    FlowProgress::Blocked(reason) => println!("{reason}"),
                    _ => show_message(&ctl),
                }
            }
            FlowStep::EnterNewPassword => {
                if ctl.password_reset_complete() {
                    return Ok(());
                }
                let Some(password) = prompt::required("New password")? else {
                    return Ok(());
                };
                let Some(confirm) = prompt::required("Confirm new password")? else {
                    return Ok(());
                };

                let draft = ctl.draft_mut();
                draft.password = password;
                draft.confirm_password = confirm;

                match ctl.submit_new_password().await? {
                    FlowProgress::Blocked(reason) => println!("{reason}"),
                    _ => show_message(&ctl),
                }
            }
            _ => return Ok(()),
        }
    }
}

/// `kriya set-password`: local password for a federated account.
pub async fn set_password(app: &App) -> anyhow::Result<()> {
    let upgrade = PasswordUpgrade::open(app.gateway.clone(), app.store.clone())?;
    println!("Setting a password for {}", upgrade.email());

    loop {
        let Some(password) = prompt::required("New password")? else {
            return Ok(());
        };
        let Some(confirm) = prompt::required("Confirm new password")? else {
            return Ok(());
        };

        match upgrade.submit(&password, &confirm).await? {
            UpgradeOutcome::Completed => {
                println!("Password set. You can now sign in with it directly.");
                return Ok(());
            }
            UpgradeOutcome::Blocked(reason) => println!("{reason}"),
            UpgradeOutcome::Rejected(message) => println!("{message}"),
        }
    }
}

/// `kriya status`: local session record plus a server-side probe.
pub async fn status(app: &App) -> anyhow::Result<()> {
    match app.store.load()? {
        Some(session) => {
            println!("Signed in as {}", session.email);
            if !session.has_local_password {
                println!("No local password set (federated sign-in); see `kriya set-password`");
            }
            let server_side = app.gateway.check_authenticated().await.unwrap_or(false);
            if !server_side {
                println!("Server session expired; sign in again");
            }
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

/// `kriya logout`: end the server session and drop the local record.
pub async fn logout(app: &App) -> anyhow::Result<()> {
    // The local record goes away even if the server call fails.
    if let Err(e) = app.gateway.logout().await {
        debug!(error = %e, "Logout call failed");
    }
    app.store.clear()?;
    println!("Signed out");
    Ok(())
}
