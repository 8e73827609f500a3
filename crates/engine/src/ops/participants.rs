use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, InviteNotification, InviteStatus, Participant, ParticipantRef, ResultEngine,
    TripInvite, trip_invites, trips, users, util::normalize_email,
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Maps an email to a participant identity for a trip, creating a shadow
    /// (guest) invite when no registered account exists yet.
    ///
    /// Idempotent: resolving the same email twice returns the same identity
    /// and never creates a duplicate invite. A lost unique-key race on the
    /// insert is resolved by re-reading the row the winner created.
    pub async fn resolve_or_create_participant(
        &self,
        trip_id: &str,
        email: &str,
        display_name_hint: Option<&str>,
        avatar_hint: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<ParticipantRef> {
        let email = normalize_email(email)?;

        let resolved: ResultEngine<(ParticipantRef, Option<InviteNotification>)> =
            with_tx!(self, |db_tx| {
                let trip = self.require_trip_member(&db_tx, trip_id, user_id).await?;

                // The creator is always a member participant, never invited.
                let owner = self.require_user(&db_tx, &trip.owner_id).await?;
                if normalize_email(&owner.email)? == email {
                    Ok((
                        ParticipantRef::Member {
                            user_id: owner.username,
                        },
                        None,
                    ))
                } else {
                    let account = find_user_by_email(&db_tx, &email).await?;

                    if let Some(existing) = self.find_invite(&db_tx, trip_id, &email).await? {
                        Ok((participant_ref(&existing, account.as_ref())?, None))
                    } else {
                        let mut invite = TripInvite::new(trip_id.to_string(), email.clone());
                        invite.guest_name = normalize_optional_text(display_name_hint);
                        invite.guest_avatar = normalize_optional_text(avatar_hint);

                        let inserted =
                            match trip_invites::ActiveModel::from(&invite).insert(&db_tx).await {
                                Ok(model) => model,
                                // Concurrent resolution of the same email: reuse the winner.
                                Err(insert_err) => self
                                    .find_invite(&db_tx, trip_id, &email)
                                    .await?
                                    .ok_or(EngineError::Database(insert_err))?,
                            };

                        let reference = participant_ref(&inserted, account.as_ref())?;
                        let inviter = self.require_user(&db_tx, user_id).await?;
                        let notification = InviteNotification {
                            recipient_email: email.clone(),
                            trip_name: trip.name.clone(),
                            inviter_name: inviter
                                .display_name
                                .unwrap_or_else(|| inviter.username.clone()),
                            join_link: format!("/trips/{}/join", trip.id),
                            unsubscribe_link: format!("/unsubscribe/{}", inserted.id),
                        };
                        Ok((reference, Some(notification)))
                    }
                }
            });
        let (participant, notification) = resolved?;

        // Fire-and-forget: delivery failure must never fail resolution.
        if let Some(notification) = notification
            && let Err(err) = self.notifier.send_invitation(notification)
        {
            tracing::warn!("invitation notification failed: {err}");
        }

        Ok(participant)
    }

    /// Assembles the full roster: the creator plus every non-rejected invite,
    /// each invite resolved against registered accounts by email.
    ///
    /// Ordered by email so equal-split remainder distribution is
    /// deterministic.
    pub async fn trip_roster(&self, trip_id: &str, user_id: &str) -> ResultEngine<Vec<Participant>> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_member(&db_tx, trip_id, user_id).await?;
            self.roster_in_tx(&db_tx, &trip).await
        })
    }

    pub(super) async fn roster_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        trip: &trips::Model,
    ) -> ResultEngine<Vec<Participant>> {
        let owner = self.require_user(db_tx, &trip.owner_id).await?;
        let mut roster = vec![Participant {
            reference: ParticipantRef::Member {
                user_id: owner.username.clone(),
            },
            email: normalize_email(&owner.email)?,
            display_name: owner.display_name.unwrap_or_else(|| owner.username.clone()),
            avatar: owner.avatar,
            is_guest: false,
        }];

        let invites = trip_invites::Entity::find()
            .filter(trip_invites::Column::TripId.eq(trip.id.clone()))
            .filter(trip_invites::Column::Status.ne(InviteStatus::Rejected.as_str()))
            .all(db_tx)
            .await?;

        for invite_model in invites {
            if invite_model.email == roster[0].email {
                continue;
            }
            let account = find_user_by_email(db_tx, &invite_model.email).await?;
            let invite = TripInvite::try_from(invite_model)?;
            roster.push(match account {
                // A registered account's own identity wins over invite hints.
                Some(user) => Participant {
                    reference: ParticipantRef::Member {
                        user_id: user.username.clone(),
                    },
                    email: invite.email,
                    display_name: user.display_name.unwrap_or(user.username),
                    avatar: user.avatar,
                    is_guest: false,
                },
                None => Participant {
                    reference: ParticipantRef::Guest {
                        invite_id: invite.id,
                    },
                    display_name: invite
                        .guest_name
                        .clone()
                        .unwrap_or_else(|| invite.email.clone()),
                    email: invite.email,
                    avatar: invite.guest_avatar,
                    is_guest: true,
                },
            });
        }

        roster.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(roster)
    }

    /// Flips an invite to accepted; the acting user's email must match.
    pub async fn accept_invite(&self, trip_id: &str, user_id: &str) -> ResultEngine<()> {
        self.set_invite_status(trip_id, user_id, InviteStatus::Accepted)
            .await
    }

    /// Flips an invite to rejected; the acting user's email must match.
    pub async fn reject_invite(&self, trip_id: &str, user_id: &str) -> ResultEngine<()> {
        self.set_invite_status(trip_id, user_id, InviteStatus::Rejected)
            .await
    }

    async fn set_invite_status(
        &self,
        trip_id: &str,
        user_id: &str,
        status: InviteStatus,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let email = normalize_email(&user.email)?;
            let invite = self
                .find_invite(&db_tx, trip_id, &email)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("invite not exists".to_string()))?;

            let model = trip_invites::ActiveModel {
                id: ActiveValue::Set(invite.id),
                status: ActiveValue::Set(status.as_str().to_string()),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    pub(super) async fn find_invite(
        &self,
        db_tx: &DatabaseTransaction,
        trip_id: &str,
        email: &str,
    ) -> ResultEngine<Option<trip_invites::Model>> {
        trip_invites::Entity::find()
            .filter(trip_invites::Column::TripId.eq(trip_id.to_string()))
            .filter(trip_invites::Column::Email.eq(email.to_string()))
            .one(db_tx)
            .await
            .map_err(Into::into)
    }
}

async fn find_user_by_email(
    db_tx: &DatabaseTransaction,
    email: &str,
) -> ResultEngine<Option<users::Model>> {
    users::Entity::find()
        .filter(users::Column::Email.eq(email.to_string()))
        .one(db_tx)
        .await
        .map_err(Into::into)
}

fn participant_ref(
    invite: &trip_invites::Model,
    account: Option<&users::Model>,
) -> ResultEngine<ParticipantRef> {
    match account {
        Some(user) => Ok(ParticipantRef::Member {
            user_id: user.username.clone(),
        }),
        None => Ok(ParticipantRef::Guest {
            invite_id: crate::util::parse_uuid(&invite.id, "invite")?,
        }),
    }
}
