//! Property tests over generated push sequences.

use proptest::prelude::*;
use tran_core::Transaction;
use tran_testkit::{push_sequence_strategy, CallRecorder, PropTestConfig};

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn queue_preserves_every_push(plans in push_sequence_strategy(0, 24)) {
        let recorder = CallRecorder::new();
        let mut txn = Transaction::new();
        for (i, plan) in plans.iter().enumerate() {
            txn.push_with(
                recorder.callable(i.to_string()),
                plan.positional.clone(),
                plan.keywords.clone(),
            )
            .unwrap();
        }

        prop_assert_eq!(txn.len(), plans.len());
        for (queued, plan) in txn.queue().iter().zip(&plans) {
            prop_assert_eq!(queued.positional(), &plan.positional[..]);
            prop_assert_eq!(queued.keywords(), &plan.keywords);
        }
    }

    #[test]
    fn commit_delivers_in_fifo_order(plans in push_sequence_strategy(0, 24)) {
        let recorder = CallRecorder::new();
        let mut txn = Transaction::new();
        for (i, plan) in plans.iter().enumerate() {
            txn.push_with(
                recorder.callable(i.to_string()),
                plan.positional.clone(),
                plan.keywords.clone(),
            )
            .unwrap();
        }
        txn.commit().unwrap();

        let calls = recorder.calls();
        prop_assert_eq!(calls.len(), plans.len());
        for (i, (call, plan)) in calls.iter().zip(&plans).enumerate() {
            prop_assert_eq!(&call.name, &i.to_string());
            prop_assert_eq!(&call.positional, &plan.positional);
            prop_assert_eq!(&call.keywords, &plan.keywords);
            prop_assert!(!call.had_receiver);
        }
    }

    #[test]
    fn bound_commit_prepends_receiver(plans in push_sequence_strategy(1, 12)) {
        let recorder = CallRecorder::new();
        let mut txn = Transaction::bound(());
        for plan in &plans {
            txn.push(recorder.callable("call"), plan.positional.clone()).unwrap();
        }
        txn.commit().unwrap();

        for (call, plan) in recorder.calls().iter().zip(&plans) {
            prop_assert!(call.had_receiver);
            prop_assert_eq!(call.arity, plan.positional.len() + 1);
        }
    }
}

proptest! {
    #![proptest_config(PropTestConfig::thorough().to_proptest_config())]

    #[test]
    fn failure_point_bounds_execution(len in 1usize..20, fail_at in 0usize..20) {
        let fail_at = fail_at % len;
        let recorder = CallRecorder::new();
        let mut txn = Transaction::new();
        for i in 0..len {
            if i == fail_at {
                txn.push(recorder.failing(i.to_string(), tran_testkit::Signal::Failure), vec![])
                    .unwrap();
            } else {
                txn.push(recorder.callable(i.to_string()), vec![]).unwrap();
            }
        }

        let err = txn.commit().unwrap_err();
        prop_assert_eq!(err.failed_index(), Some(fail_at));
        prop_assert_eq!(recorder.count(), fail_at + 1);
        prop_assert!(txn.commit().unwrap_err().is_already_committed());
        prop_assert_eq!(recorder.count(), fail_at + 1);
    }
}
