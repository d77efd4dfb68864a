use serde_json::{Value, json};
use uuid::Uuid;

use crate::common::{TestApp, routes};

fn release(major: i32, minor: i32, patch: i32) -> Value {
    json!({
        "major": major,
        "minor": minor,
        "patch": patch,
    })
}

async fn count(app: &TestApp, query: &str) -> u64 {
    let path = if query.is_empty() {
        routes::APP_VERSIONS_COUNT.to_string()
    } else {
        format!("{}?{}", routes::APP_VERSIONS_COUNT, query)
    };
    let res = app.get(&path).await;
    assert_eq!(res.status, 200, "count failed: {}", res.text);
    res.body.as_u64().expect("count is not an integer")
}

async fn list(app: &TestApp, query: &str) -> Vec<Value> {
    let path = if query.is_empty() {
        routes::APP_VERSIONS.to_string()
    } else {
        format!("{}?{}", routes::APP_VERSIONS, query)
    };
    let res = app.get(&path).await;
    assert_eq!(res.status, 200, "list failed: {}", res.text);
    res.body.as_array().expect("list is not an array").clone()
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn create_assigns_an_id_and_returns_201_with_location() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::APP_VERSIONS,
                &json!({
                    "major": 2,
                    "minor": 4,
                    "patch": 0,
                    "releaseDate": "2024-03-05T10:00:00Z",
                    "description": "spring release",
                    "location": "s3://releases/2.4.0",
                    "type": "INSTALLABLE"
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let id = res.body["id"].as_str().expect("no id assigned");
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(
            res.location.as_deref(),
            Some(format!("/api/app-versions/{id}").as_str())
        );
        assert_eq!(res.body["major"], json!(2));
        assert_eq!(res.body["type"], json!("INSTALLABLE"));
        assert_eq!(res.body["description"], json!("spring release"));
    }

    #[tokio::test]
    async fn create_with_preset_id_is_rejected_and_stores_nothing() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::APP_VERSIONS,
                &json!({ "id": Uuid::new_v4(), "major": 1 }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], json!("VALIDATION_ERROR"));
        assert_eq!(count(&app, "").await, 0);
    }

    #[tokio::test]
    async fn created_record_reads_back_with_the_same_fields() {
        let app = TestApp::spawn().await;
        let id = app
            .create_app_version(&json!({
                "major": 1,
                "minor": 0,
                "patch": 3,
                "description": "hotfix",
            }))
            .await;

        let res = app.get(&routes::app_version(&id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], json!(id));
        assert_eq!(res.body["major"], json!(1));
        assert_eq!(res.body["patch"], json!(3));
        assert_eq!(res.body["description"], json!("hotfix"));
        assert_eq!(res.body["location"], Value::Null);
        assert_eq!(res.body["type"], Value::Null);
    }

    #[tokio::test]
    async fn each_create_gets_a_fresh_id() {
        let app = TestApp::spawn().await;
        let first = app.create_app_version(&release(1, 0, 0)).await;
        let second = app.create_app_version(&release(1, 0, 0)).await;
        assert_ne!(first, second);
    }
}

mod fetching {
    use super::*;

    #[tokio::test]
    async fn get_unknown_id_is_404() {
        let app = TestApp::spawn().await;
        let res = app.get(&routes::app_version(&Uuid::new_v4().to_string())).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], json!("NOT_FOUND"));
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn put_overwrites_every_field_including_omitted_ones() {
        let app = TestApp::spawn().await;
        let id = app
            .create_app_version(&json!({
                "major": 1,
                "minor": 2,
                "patch": 3,
                "description": "to be dropped",
                "location": "s3://old",
                "type": "PORTABLE"
            }))
            .await;

        let res = app
            .put(
                &routes::app_version(&id),
                &json!({ "id": id, "major": 9 }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["major"], json!(9));
        assert_eq!(res.body["minor"], Value::Null);
        assert_eq!(res.body["description"], Value::Null);
        assert_eq!(res.body["location"], Value::Null);
        assert_eq!(res.body["type"], Value::Null);

        let stored = app.get(&routes::app_version(&id)).await;
        assert_eq!(stored.body["major"], json!(9));
        assert_eq!(stored.body["description"], Value::Null);
    }

    #[tokio::test]
    async fn put_without_body_id_is_400() {
        let app = TestApp::spawn().await;
        let id = app.create_app_version(&release(1, 0, 0)).await;

        let res = app.put(&routes::app_version(&id), &json!({ "major": 2 })).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn put_with_mismatched_body_id_is_400() {
        let app = TestApp::spawn().await;
        let id = app.create_app_version(&release(1, 0, 0)).await;

        let res = app
            .put(
                &routes::app_version(&id),
                &json!({ "id": Uuid::new_v4(), "major": 2 }),
            )
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn put_on_unknown_id_is_400() {
        // PUT pre-checks existence and reports a bad request rather
        // than 404.
        let app = TestApp::spawn().await;
        let ghost = Uuid::new_v4().to_string();

        let res = app
            .put(
                &routes::app_version(&ghost),
                &json!({ "id": ghost, "major": 2 }),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], json!("VALIDATION_ERROR"));
    }
}

mod partial_update {
    use super::*;

    #[tokio::test]
    async fn patch_merges_only_the_provided_fields() {
        let app = TestApp::spawn().await;
        let id = app
            .create_app_version(&json!({
                "major": 1,
                "minor": 1,
                "patch": 1,
                "description": "AAAAAAAAAA",
                "location": "AAAAAAAAAA",
                "type": "PORTABLE"
            }))
            .await;

        let res = app
            .patch(
                &routes::app_version(&id),
                &json!({
                    "id": id,
                    "location": "BBBBBBBBBB",
                    "type": "INSTALLABLE",
                    "lastModifiedBy": "BBBBBBBBBB"
                }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["major"], json!(1));
        assert_eq!(res.body["minor"], json!(1));
        assert_eq!(res.body["patch"], json!(1));
        assert_eq!(res.body["description"], json!("AAAAAAAAAA"));
        assert_eq!(res.body["location"], json!("BBBBBBBBBB"));
        assert_eq!(res.body["type"], json!("INSTALLABLE"));
        assert_eq!(res.body["lastModifiedBy"], json!("BBBBBBBBBB"));
    }

    #[tokio::test]
    async fn empty_patch_returns_the_record_unchanged() {
        let app = TestApp::spawn().await;
        let id = app
            .create_app_version(&json!({ "major": 3, "description": "stable" }))
            .await;

        let res = app
            .patch(&routes::app_version(&id), &json!({ "id": id }))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["major"], json!(3));
        assert_eq!(res.body["description"], json!("stable"));
    }

    #[tokio::test]
    async fn patch_without_body_id_is_400() {
        let app = TestApp::spawn().await;
        let id = app.create_app_version(&release(1, 0, 0)).await;

        let res = app
            .patch(&routes::app_version(&id), &json!({ "major": 2 }))
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn patch_with_mismatched_body_id_is_400() {
        let app = TestApp::spawn().await;
        let id = app.create_app_version(&release(1, 0, 0)).await;

        let res = app
            .patch(
                &routes::app_version(&id),
                &json!({ "id": Uuid::new_v4(), "major": 2 }),
            )
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn patch_on_unknown_id_is_404() {
        let app = TestApp::spawn().await;
        let ghost = Uuid::new_v4().to_string();

        let res = app
            .patch(
                &routes::app_version(&ghost),
                &json!({ "id": ghost, "major": 2 }),
            )
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], json!("NOT_FOUND"));
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn delete_removes_the_record_and_drops_the_count_by_one() {
        let app = TestApp::spawn().await;
        let keep = app.create_app_version(&release(1, 0, 0)).await;
        let gone = app.create_app_version(&release(2, 0, 0)).await;
        assert_eq!(count(&app, "").await, 2);

        let res = app.delete(&routes::app_version(&gone)).await;
        assert_eq!(res.status, 204);

        assert_eq!(count(&app, "").await, 1);
        assert_eq!(app.get(&routes::app_version(&gone)).await.status, 404);
        assert_eq!(app.get(&routes::app_version(&keep)).await.status, 200);
    }

    #[tokio::test]
    async fn deleting_an_unknown_id_is_a_204_no_op() {
        let app = TestApp::spawn().await;
        app.create_app_version(&release(1, 0, 0)).await;

        let res = app
            .delete(&routes::app_version(&Uuid::new_v4().to_string()))
            .await;
        assert_eq!(res.status, 204);
        assert_eq!(count(&app, "").await, 1);
    }
}

mod filtering {
    use super::*;

    /// Three releases: 1.0.0 portable "first beta" at s3://a, 2.1.0
    /// installable "second" at s3://b (no description on the third), 3.0.1.
    async fn seed(app: &TestApp) -> (String, String, String) {
        let a = app
            .create_app_version(&json!({
                "major": 1, "minor": 0, "patch": 0,
                "releaseDate": "2023-06-01T00:00:00Z",
                "description": "first beta",
                "location": "s3://a",
                "type": "PORTABLE"
            }))
            .await;
        let b = app
            .create_app_version(&json!({
                "major": 2, "minor": 1, "patch": 0,
                "releaseDate": "2024-06-01T00:00:00Z",
                "description": "second",
                "location": "s3://b",
                "type": "INSTALLABLE"
            }))
            .await;
        let c = app
            .create_app_version(&json!({
                "major": 3, "minor": 0, "patch": 1,
                "releaseDate": "2025-06-01T00:00:00Z",
                "location": "s3://c"
            }))
            .await;
        (a, b, c)
    }

    fn ids(rows: &[Value]) -> Vec<String> {
        rows.iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn equals_includes_and_excludes() {
        let app = TestApp::spawn().await;
        let (a, _, _) = seed(&app).await;

        let hit = list(&app, "major.equals=1").await;
        assert_eq!(ids(&hit), vec![a]);
        assert!(list(&app, "major.equals=4").await.is_empty());
    }

    #[tokio::test]
    async fn in_and_not_in_are_set_membership() {
        let app = TestApp::spawn().await;
        let (a, b, c) = seed(&app).await;

        let hit = list(&app, "major.in=1,2&sort_by=major&sort_order=asc").await;
        assert_eq!(ids(&hit), vec![a.clone(), b]);

        let rest = list(&app, "major.notIn=1,2").await;
        assert_eq!(ids(&rest), vec![c]);

        assert!(!ids(&list(&app, "major.in=4,5").await).contains(&a));
    }

    #[tokio::test]
    async fn range_operators_respect_boundaries() {
        let app = TestApp::spawn().await;
        let (a, b, c) = seed(&app).await;

        assert_eq!(
            ids(&list(&app, "major.greaterThan=0&sort_by=major&sort_order=asc").await),
            vec![a.clone(), b.clone(), c.clone()]
        );
        assert_eq!(
            ids(&list(&app, "major.greaterThan=1&sort_by=major&sort_order=asc").await),
            vec![b.clone(), c.clone()]
        );
        assert_eq!(
            ids(&list(&app, "major.greaterThanOrEqual=3").await),
            vec![c.clone()]
        );
        assert_eq!(ids(&list(&app, "major.lessThan=2").await), vec![a.clone()]);
        assert_eq!(
            ids(&list(&app, "major.lessThanOrEqual=2&sort_by=major&sort_order=asc").await),
            vec![a, b]
        );
    }

    #[tokio::test]
    async fn not_equals_excludes_exactly_the_match() {
        let app = TestApp::spawn().await;
        let (a, b, c) = seed(&app).await;

        let rows = ids(&list(&app, "major.notEquals=2&sort_by=major&sort_order=asc").await);
        assert_eq!(rows, vec![a, c]);
        assert!(!rows.contains(&b));
    }

    #[tokio::test]
    async fn specified_matches_null_and_non_null() {
        let app = TestApp::spawn().await;
        let (_, _, c) = seed(&app).await;

        assert_eq!(
            ids(&list(&app, "description.specified=false").await),
            vec![c]
        );
        assert_eq!(count(&app, "description.specified=true").await, 2);
    }

    #[tokio::test]
    async fn contains_is_a_substring_match() {
        let app = TestApp::spawn().await;
        let (a, b, c) = seed(&app).await;

        assert_eq!(ids(&list(&app, "description.contains=beta").await), vec![a]);
        // Case-sensitive: no normalization on either side.
        assert!(list(&app, "description.contains=BETA").await.is_empty());

        let without = ids(&list(&app, "description.doesNotContain=beta").await);
        assert_eq!(without, vec![b]);
        // doesNotContain is a predicate on the value, so null descriptions
        // do not match it either.
        assert!(!without.contains(&c));
    }

    #[tokio::test]
    async fn enum_uuid_and_timestamp_filters() {
        let app = TestApp::spawn().await;
        let (a, b, c) = seed(&app).await;

        assert_eq!(ids(&list(&app, "type.equals=PORTABLE").await), vec![a.clone()]);
        assert_eq!(
            ids(&list(&app, &format!("id.equals={b}")).await),
            vec![b.clone()]
        );
        assert_eq!(
            ids(&list(
                &app,
                "releaseDate.greaterThan=2024-12-31T00:00:00Z"
            )
            .await),
            vec![c]
        );
    }

    #[tokio::test]
    async fn filters_compose_with_and() {
        let app = TestApp::spawn().await;
        let (_, b, _) = seed(&app).await;

        let rows = list(&app, "major.greaterThan=1&type.equals=INSTALLABLE").await;
        assert_eq!(ids(&rows), vec![b]);
        assert!(
            list(&app, "major.greaterThan=2&type.equals=INSTALLABLE")
                .await
                .is_empty()
        );
    }

    #[tokio::test]
    async fn empty_criteria_matches_every_record() {
        let app = TestApp::spawn().await;
        seed(&app).await;

        assert_eq!(list(&app, "").await.len(), 3);
        assert_eq!(count(&app, "").await, 3);
    }

    #[tokio::test]
    async fn count_always_equals_list_length() {
        let app = TestApp::spawn().await;
        seed(&app).await;

        for query in [
            "",
            "major.greaterThan=1",
            "description.specified=true",
            "type.equals=PORTABLE",
            "major.in=1,3",
            "distinct=true",
        ] {
            assert_eq!(
                count(&app, query).await,
                list(&app, query).await.len() as u64,
                "count/list mismatch for '{query}'"
            );
        }
    }

    #[tokio::test]
    async fn malformed_filters_are_rejected() {
        let app = TestApp::spawn().await;
        seed(&app).await;

        for query in [
            "unknown.equals=1",
            "major.like=1",
            "major.equals=one",
            "bogus=1",
            "distinct=maybe",
        ] {
            let res = app
                .get(&format!("{}?{}", routes::APP_VERSIONS, query))
                .await;
            assert_eq!(res.status, 400, "expected 400 for '{query}': {}", res.text);
            assert_eq!(res.body["code"], json!("VALIDATION_ERROR"));
        }
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn pagination_slices_the_sorted_result() {
        let app = TestApp::spawn().await;
        for major in 1..=3 {
            app.create_app_version(&release(major, 0, 0)).await;
        }

        let first = list(&app, "page=1&per_page=2&sort_by=major&sort_order=asc").await;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0]["major"], json!(1));
        assert_eq!(first[1]["major"], json!(2));

        let second = list(&app, "page=2&per_page=2&sort_by=major&sort_order=asc").await;
        assert_eq!(second.len(), 1);
        assert_eq!(second[0]["major"], json!(3));
    }

    #[tokio::test]
    async fn sort_order_defaults_to_descending() {
        let app = TestApp::spawn().await;
        for major in 1..=3 {
            app.create_app_version(&release(major, 0, 0)).await;
        }

        let rows = list(&app, "sort_by=major").await;
        assert_eq!(rows[0]["major"], json!(3));
        assert_eq!(rows[2]["major"], json!(1));
    }

    #[tokio::test]
    async fn page_numbers_past_the_addressable_range_are_an_empty_page() {
        let app = TestApp::spawn().await;
        app.create_app_version(&release(1, 0, 0)).await;

        let rows = list(&app, &format!("page={}&per_page=2", u64::MAX)).await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn unknown_sort_field_is_400() {
        let app = TestApp::spawn().await;
        let res = app
            .get(&format!("{}?sort_by=bogus", routes::APP_VERSIONS))
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn unknown_sort_order_is_400() {
        let app = TestApp::spawn().await;
        app.create_app_version(&release(1, 0, 0)).await;

        let res = app
            .get(&format!(
                "{}?sort_by=major&sort_order=ascending",
                routes::APP_VERSIONS
            ))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], json!("VALIDATION_ERROR"));
    }
}

mod auditing {
    use super::*;
    use corebe_server::audit::Auditor;

    #[tokio::test]
    async fn configured_auditor_stamps_absent_audit_fields() {
        let app = TestApp::spawn_with_auditor(Auditor::new(Some("system".into()))).await;

        let res = app.post(routes::APP_VERSIONS, &release(1, 0, 0)).await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["createdBy"], json!("system"));
        assert!(res.body["createdDate"].is_string());
        assert_eq!(res.body["lastModifiedBy"], json!("system"));

        let id = res.body["id"].as_str().unwrap().to_string();
        let patched = app
            .patch(
                &routes::app_version(&id),
                &json!({ "id": id, "minor": 1 }),
            )
            .await;
        assert_eq!(patched.body["lastModifiedBy"], json!("system"));
    }

    #[tokio::test]
    async fn caller_provided_audit_fields_are_not_overwritten() {
        let app = TestApp::spawn_with_auditor(Auditor::new(Some("system".into()))).await;

        let res = app
            .post(
                routes::APP_VERSIONS,
                &json!({ "major": 1, "createdBy": "release-bot" }),
            )
            .await;
        assert_eq!(res.status, 201);
        assert_eq!(res.body["createdBy"], json!("release-bot"));
    }

    #[tokio::test]
    async fn default_auditor_leaves_audit_fields_to_the_caller() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::APP_VERSIONS, &release(1, 0, 0)).await;
        assert_eq!(res.status, 201);
        assert_eq!(res.body["createdBy"], Value::Null);
        assert_eq!(res.body["createdDate"], Value::Null);
    }
}
