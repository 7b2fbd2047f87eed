// End-to-end tests for the media daemon.
//
// Each test gets its own daemon instance: a temp media library, stub
// player/resolver scripts instead of the real audio binaries, a stub
// synthesis backend, and the full HTTP router plus HC3 TCP listener
// bound to ephemeral ports. No audio hardware is touched, so the suite
// runs in parallel.

mod helpers;
mod test_playback;
mod test_status;
mod test_tts;
