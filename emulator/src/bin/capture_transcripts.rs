use std::io;

#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use lock_core::config::DEFAULT_PASSCODE;
use session::{Session, TranscriptLogger, TranscriptProfile};

fn main() -> io::Result<()> {
    for profile in TranscriptProfile::ALL {
        record_profile(profile)?;
        println!("wrote {}", profile.log_path());
    }
    Ok(())
}

fn record_profile(profile: TranscriptProfile) -> io::Result<()> {
    let transcript = TranscriptLogger::for_profile(profile)?;
    let mut session = Session::new(DEFAULT_PASSCODE, Some(transcript))?;
    for line in profile.script() {
        let _ = session.handle_command(line)?;
    }
    Ok(())
}
