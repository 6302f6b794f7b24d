mod common;

use anandwan_outreach::intake::{
    ContactSchema, DonationSchema, ValidationContext, VolunteerDraft, VolunteerSchema,
};
use anandwan_outreach::{Error, IntakeController, IntakeState, LocalStore, Partition, SubmissionRecord};
use chrono::NaiveDate;
use serde_json::json;

fn ctx() -> ValidationContext {
    ValidationContext::at(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap())
}

fn fill_volunteer(draft: &mut VolunteerDraft) {
    draft.name = "Jo".into();
    draft.email = "jo@example.org".into();
    draft.phone = "9822012345".into();
    draft.skill = "manual".into();
    draft.availability_date = "2026-06-15".into();
    draft.duration = "Weekends in June".into();
}

async fn stored(local: &LocalStore, partition: Partition) -> Vec<SubmissionRecord> {
    local.get(partition.key()).await.unwrap().unwrap_or_default()
}

#[tokio::test]
async fn bad_email_is_the_only_error_and_nothing_is_written() {
    let (store, local) = common::submission_store().await;
    let mut form = IntakeController::<VolunteerSchema>::new(store);

    form.edit(&ctx(), |draft| {
        fill_volunteer(draft);
        draft.email = "not-an-email".into();
    });

    let errors = form.validate(&ctx()).unwrap_err();
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email"]);

    let err = form.submit(&ctx()).await.unwrap_err();
    assert!(matches!(err, Error::Validation(ref fields) if fields.contains("email")));
    assert_eq!(form.state(), IntakeState::Entry);
    assert_eq!(form.draft().email, "not-an-email");
    assert!(stored(&local, Partition::Volunteers).await.is_empty());
}

#[tokio::test]
async fn valid_submission_appends_once_and_enters_submitted_state() {
    let (store, local) = common::submission_store().await;
    let mut form = IntakeController::<VolunteerSchema>::new(store);

    form.edit(&ctx(), fill_volunteer);
    assert!(form.errors().is_empty());

    let record = form.submit(&ctx()).await.unwrap();
    assert_eq!(form.state(), IntakeState::Submitted { record_id: record.id });
    assert_eq!(record.fields["skill"], json!("manual"));
    assert_eq!(record.fields["availabilityDate"], json!("2026-06-15"));
    assert!(!record.fields.contains_key("notes"));

    assert_eq!(stored(&local, Partition::Volunteers).await, vec![record]);
}

#[tokio::test]
async fn submitted_form_rejects_resubmission_until_reset() {
    let (store, local) = common::submission_store().await;
    let mut form = IntakeController::<VolunteerSchema>::new(store);

    form.edit(&ctx(), fill_volunteer);
    let first = form.submit(&ctx()).await.unwrap();

    assert!(matches!(form.submit(&ctx()).await, Err(Error::AlreadySubmitted)));
    assert_eq!(stored(&local, Partition::Volunteers).await.len(), 1);

    form.submit_another();
    assert_eq!(form.state(), IntakeState::Entry);
    assert_eq!(form.draft(), &VolunteerDraft::default());

    form.edit(&ctx(), fill_volunteer);
    let second = form.submit(&ctx()).await.unwrap();
    assert!(second.id > first.id);
    assert_eq!(stored(&local, Partition::Volunteers).await.len(), 2);
}

#[tokio::test]
async fn donation_errors_follow_the_selected_type() {
    let (store, _local) = common::submission_store().await;
    let mut form = IntakeController::<DonationSchema>::new(store);

    let errors = form.edit(&ctx(), |draft| {
        draft.name = "Ravi".into();
        draft.email = "ravi@example.com".into();
        draft.phone = "9876501234".into();
        draft.address = "Anandwan, Warora, Chandrapur".into();
    });
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["amount"]);

    let errors = form.edit(&ctx(), |draft| draft.donation_type = "clothes".into());
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["description"]);

    let errors = form.edit(&ctx(), |draft| draft.description = "Winter blankets, 20 pieces".into());
    assert!(errors.is_empty());

    let errors = form.edit(&ctx(), |draft| draft.donation_type = "money".into());
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["amount"]);
}

#[tokio::test]
async fn donation_record_keeps_only_the_revealed_field() {
    let (store, local) = common::submission_store().await;
    let mut form = IntakeController::<DonationSchema>::new(store);

    form.edit(&ctx(), |draft| {
        draft.name = "Ravi".into();
        draft.email = "ravi@example.com".into();
        draft.phone = "9876501234".into();
        draft.address = "Anandwan, Warora, Chandrapur".into();
        draft.amount = "2500".into();
        draft.description = "left over from an earlier choice".into();
    });
    let record = form.submit(&ctx()).await.unwrap();

    assert_eq!(record.fields["donationType"], json!("money"));
    assert_eq!(record.fields["amount"], json!("2500"));
    assert!(!record.fields.contains_key("description"));
    assert_eq!(stored(&local, Partition::Donations).await.len(), 1);
}

#[tokio::test]
async fn contact_submissions_land_in_their_own_partition() {
    let (store, local) = common::submission_store().await;
    let mut form = IntakeController::<ContactSchema>::new(store);

    form.edit(&ctx(), |draft| {
        draft.name = "Meera".into();
        draft.email = "meera@example.in".into();
        draft.phone = "+91 712 255 0000".into();
        draft.subject = "tech".into();
        draft.message = "The donate page will not load on my phone.".into();
    });
    form.submit(&ctx()).await.unwrap();

    assert_eq!(stored(&local, Partition::Contacts).await.len(), 1);
    assert!(stored(&local, Partition::Volunteers).await.is_empty());
}
