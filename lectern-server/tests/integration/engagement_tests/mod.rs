mod test_persisted_credits_resume;
mod test_signal_before_admission_is_noop;
