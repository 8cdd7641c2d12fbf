use diameter::peer::{transition, PeerEvent, PeerState};

#[test]
fn test_full_lifecycle_happy_path() {
    let mut state = PeerState::Closed;
    state = transition(state, PeerEvent::TransportUp).unwrap();
    assert_eq!(state, PeerState::Connecting);

    state = transition(state, PeerEvent::SendCer).unwrap();
    assert_eq!(state, PeerState::Connecting);

    state = transition(state, PeerEvent::RecvCea).unwrap();
    assert_eq!(state, PeerState::Ready);

    state = transition(state, PeerEvent::SendDwr).unwrap();
    assert_eq!(state, PeerState::ReadyWaitingDwa);

    state = transition(state, PeerEvent::RecvDwa).unwrap();
    assert_eq!(state, PeerState::Ready);

    state = transition(state, PeerEvent::LocalDisconnect).unwrap();
    assert_eq!(state, PeerState::Closing);

    state = transition(state, PeerEvent::TransportDown).unwrap();
    assert_eq!(state, PeerState::Closed);
}

#[test]
fn test_peer_initiated_disconnect() {
    let mut state = PeerState::Ready;
    state = transition(state, PeerEvent::RecvDpr).unwrap();
    assert_eq!(state, PeerState::Disconnecting);

    state = transition(state, PeerEvent::RecvDpa).unwrap();
    assert_eq!(state, PeerState::Closing);
}

#[test]
fn test_dwa_timeout_closes_the_link() {
    let state = transition(PeerState::ReadyWaitingDwa, PeerEvent::DwaTimeout).unwrap();
    assert_eq!(state, PeerState::Closing);
}

#[test]
fn test_a_watchdog_request_while_waiting_on_dwa_does_not_reset_the_wait() {
    let state = transition(PeerState::ReadyWaitingDwa, PeerEvent::RecvDwr).unwrap();
    assert_eq!(state, PeerState::ReadyWaitingDwa);
}

#[test]
fn test_idle_timeout_is_a_no_op_in_ready_states() {
    assert_eq!(
        transition(PeerState::Ready, PeerEvent::IdleTimeout).unwrap(),
        PeerState::Ready
    );
    assert_eq!(
        transition(PeerState::ReadyWaitingDwa, PeerEvent::IdleTimeout).unwrap(),
        PeerState::ReadyWaitingDwa
    );
}

#[test]
fn test_invalid_event_is_rejected_rather_than_ignored() {
    let err = transition(PeerState::Closed, PeerEvent::RecvDwa).unwrap_err();
    assert!(err.to_string().contains("invalid peer event"));
}

#[test]
fn test_cannot_send_a_second_cer_after_reaching_ready() {
    let err = transition(PeerState::Ready, PeerEvent::SendCer).unwrap_err();
    assert!(err.to_string().contains("invalid peer event"));
}
