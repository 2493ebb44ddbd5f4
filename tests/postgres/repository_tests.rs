//! Repository and branch persistence against a real database.

use std::sync::Arc;

use super::helpers::{TestDatabase, at, clock, snapshot, test_runtime};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use repo_mirror::mirror::{
    adapters::memory::InMemoryRemoteHost,
    domain::{
        Affiliation, Branch, BranchName, OrganizationFilter, OwnerKind, RemoteBranch,
        RemoteOwner, RemoteRepository, RemoteRepositoryId, Repository, RepositoryFilter,
        RepositoryId, RepositorySort, SyncScope,
    },
    ports::{BranchStore, MirrorStoreError, RepositoryStore},
    services::SyncService,
};
use rstest::rstest;

fn full_names(repositories: &[Repository]) -> Vec<&str> {
    repositories
        .iter()
        .map(|repository| repository.full_name())
        .collect()
}

fn branch(repository: &Repository, name: &str, sha: &str) -> Branch {
    Branch::from_remote(
        repository.id(),
        &RemoteBranch::new(name, sha),
        repository.snapshot().default_branch(),
        &clock(),
    )
    .expect("valid branch")
}

#[rstest]
fn upsert_keeps_local_id_and_overwrites_fields(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "mirror_upsert").expect("test database");

    rt.block_on(async {
        let first = db
            .store
            .upsert_repository(&Repository::synced(
                snapshot(7, "octo/alpha")
                    .with_description("first pass")
                    .with_pushed_at(at("2025-01-01T00:00:00Z")),
                &clock(),
            ))
            .await
            .expect("first upsert");

        let second = db
            .store
            .upsert_repository(&Repository::synced(
                snapshot(7, "octo/alpha-renamed").private(true),
                &clock(),
            ))
            .await
            .expect("second upsert");

        assert_eq!(second.id(), first.id());
        assert_eq!(second.full_name(), "octo/alpha-renamed");
        assert!(second.is_private());
        assert_eq!(second.snapshot().description(), None);
        assert_eq!(second.snapshot().pushed_at(), None);
        assert_eq!(second.last_synced(), Some(clock().0));

        let listed = db
            .store
            .list_repositories(RepositorySort::NameAsc)
            .await
            .expect("list");
        assert_eq!(listed, vec![second.clone()]);
        assert_eq!(
            db.store
                .find_by_remote_id(RemoteRepositoryId::new(7).expect("valid id"))
                .await
                .expect("lookup"),
            Some(second)
        );
    });
}

#[rstest]
fn search_escapes_wildcards_and_filters_organizations(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "mirror_search").expect("test database");

    rt.block_on(async {
        let seeds = [
            snapshot(1, "octo/fifty").with_description("50% done"),
            snapshot(2, "octo/five-hundred").with_description("500 done"),
            snapshot(3, "acme/tools")
                .with_organization("Acme")
                .with_language("Go"),
            snapshot(4, "acme/site")
                .with_organization("acme")
                .with_language("Rust")
                .private(true),
        ];
        for seed in seeds {
            db.store
                .upsert_repository(&Repository::synced(seed, &clock()))
                .await
                .expect("seed");
        }

        let percent = db
            .store
            .search(
                &RepositoryFilter::new().with_query("50%"),
                RepositorySort::NameAsc,
            )
            .await
            .expect("search");
        assert_eq!(full_names(&percent), vec!["octo/fifty"]);

        let organization = db
            .store
            .search(
                &RepositoryFilter::new()
                    .with_organization(OrganizationFilter::Named("ACME".to_owned())),
                RepositorySort::NameAsc,
            )
            .await
            .expect("search");
        assert_eq!(full_names(&organization), vec!["acme/site", "acme/tools"]);

        let personal_public = db
            .store
            .search(
                &RepositoryFilter::new()
                    .with_organization(OrganizationFilter::Personal)
                    .with_private(false),
                RepositorySort::NameDesc,
            )
            .await
            .expect("search");
        assert_eq!(
            full_names(&personal_public),
            vec!["octo/five-hundred", "octo/fifty"]
        );

        let by_language = db
            .store
            .search(
                &RepositoryFilter::new().with_language("rust"),
                RepositorySort::NameAsc,
            )
            .await
            .expect("search");
        assert_eq!(full_names(&by_language), vec!["acme/site"]);

        let language_order = db
            .store
            .list_repositories(RepositorySort::LanguageAsc)
            .await
            .expect("list");
        assert_eq!(
            full_names(&language_order),
            vec!["acme/tools", "acme/site", "octo/fifty", "octo/five-hundred"]
        );
    });
}

#[rstest]
fn search_combines_query_and_visibility_filters(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "mirror_search_combined")
        .expect("test database");

    rt.block_on(async {
        let seeds = [
            snapshot(11, "octo/test-runner")
                .with_language("Rust")
                .private(true),
            snapshot(12, "octo/toolbox")
                .with_description("Test fixtures")
                .with_language("Python"),
            snapshot(13, "testorg/api")
                .with_organization("TestOrg")
                .with_language("Go")
                .private(true),
            snapshot(14, "testorg/web")
                .with_organization("TestOrg")
                .with_language("Python"),
            snapshot(15, "octo/misc").with_language("Python"),
        ];
        for seed in seeds {
            db.store
                .upsert_repository(&Repository::synced(seed, &clock()))
                .await
                .expect("seed");
        }

        let matching = db
            .store
            .search(
                &RepositoryFilter::new().with_query("test"),
                RepositorySort::NameAsc,
            )
            .await
            .expect("search");
        assert_eq!(
            full_names(&matching),
            vec!["testorg/api", "octo/test-runner", "octo/toolbox", "testorg/web"]
        );

        let private = db
            .store
            .search(
                &RepositoryFilter::new().with_private(true),
                RepositorySort::NameAsc,
            )
            .await
            .expect("search");
        assert_eq!(full_names(&private), vec!["testorg/api", "octo/test-runner"]);

        let nothing = db
            .store
            .search(
                &RepositoryFilter::new()
                    .with_private(true)
                    .with_language("Python"),
                RepositorySort::NameAsc,
            )
            .await
            .expect("search");
        assert!(nothing.is_empty());
    });
}

#[rstest]
fn branches_upsert_by_name_and_prune(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "mirror_branches").expect("test database");

    rt.block_on(async {
        let repository = db
            .store
            .upsert_repository(&Repository::synced(snapshot(9, "octo/tree"), &clock()))
            .await
            .expect("seed");
        let feature = db
            .store
            .upsert_branch(&branch(&repository, "feature", "aaa"))
            .await
            .expect("feature");
        db.store
            .upsert_branch(&branch(&repository, "main", "bbb"))
            .await
            .expect("main");
        let updated = db
            .store
            .upsert_branch(&branch(&repository, "feature", "ccc"))
            .await
            .expect("feature again");

        assert_eq!(updated.id(), feature.id());
        assert_eq!(updated.last_commit_sha(), "ccc");

        let listed = db
            .store
            .list_branches(repository.id())
            .await
            .expect("list");
        let names: Vec<&str> = listed.iter().map(|b| b.name().as_str()).collect();
        assert_eq!(names, vec!["main", "feature"]);

        let keep = [BranchName::new("main").expect("valid name")];
        let pruned = db
            .store
            .prune_branches(repository.id(), &keep)
            .await
            .expect("prune");
        assert_eq!(pruned, 1);
        assert_eq!(
            db.store
                .find_branch(
                    repository.id(),
                    &BranchName::new("feature").expect("valid name")
                )
                .await
                .expect("lookup"),
            None
        );
    });
}

#[rstest]
fn branch_of_unknown_repository_is_rejected(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "mirror_orphan").expect("test database");

    rt.block_on(async {
        let orphan = Repository::synced(snapshot(10, "octo/ghost"), &clock());
        let result = db
            .store
            .upsert_branch(&branch(&orphan, "main", "abc"))
            .await;

        assert!(matches!(
            result,
            Err(MirrorStoreError::RepositoryNotFound(id)) if id == orphan.id()
        ));
    });
}

#[rstest]
fn delete_cascades_and_reports_missing(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "mirror_delete").expect("test database");

    rt.block_on(async {
        let repository = db
            .store
            .upsert_repository(&Repository::synced(snapshot(11, "octo/gone"), &clock()))
            .await
            .expect("seed");
        db.store
            .upsert_branch(&branch(&repository, "main", "abc"))
            .await
            .expect("branch");

        db.store
            .delete_repository(repository.id())
            .await
            .expect("delete");

        assert!(
            db.store
                .list_branches(repository.id())
                .await
                .expect("list")
                .is_empty()
        );
        let again = db.store.delete_repository(repository.id()).await;
        assert!(matches!(again, Err(MirrorStoreError::RepositoryNotFound(_))));
        assert!(matches!(
            db.store.delete_repository(RepositoryId::new()).await,
            Err(MirrorStoreError::RepositoryNotFound(_))
        ));
    });
}

#[rstest]
fn sync_service_writes_through_postgres(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "mirror_sync").expect("test database");

    rt.block_on(async {
        let store = Arc::new(db.store.clone());
        let remote = Arc::new(InMemoryRemoteHost::new("octo"));
        remote
            .add_repository(
                Affiliation::OrganizationMember,
                RemoteRepository {
                    id: 501,
                    name: "platform".to_owned(),
                    full_name: Some("acme/platform".to_owned()),
                    description: Some("Shared platform".to_owned()),
                    html_url: "https://github.com/acme/platform".to_owned(),
                    private: true,
                    fork: false,
                    created_at: "2023-03-03T03:03:03Z".to_owned(),
                    updated_at: "2025-05-05T05:05:05Z".to_owned(),
                    pushed_at: None,
                    size: 1024,
                    language: Some("Rust".to_owned()),
                    default_branch: Some("trunk".to_owned()),
                    owner: RemoteOwner {
                        login: "acme".to_owned(),
                        kind: OwnerKind::Organization,
                    },
                    stargazers_count: 0,
                },
            )
            .expect("seed remote");
        remote
            .set_branches(
                "acme/platform",
                vec![
                    RemoteBranch::new("trunk", "111").with_commit_message("Release"),
                    RemoteBranch::new("next", "222"),
                ],
            )
            .expect("seed branches");
        let service = SyncService::new(
            Arc::clone(&store),
            Arc::clone(&remote),
            Arc::new(clock()),
            "/srv/mirror",
        );

        let outcome = service
            .sync(&SyncScope::new())
            .await
            .expect("sync should succeed");

        assert_eq!(outcome.summary.total, 1);
        assert_eq!(outcome.summary.private, 1);
        assert_eq!(outcome.summary.organization, 1);
        let stored = store
            .find_by_full_name("acme/platform")
            .await
            .expect("lookup")
            .expect("stored repository");
        assert_eq!(stored.organization(), Some("acme"));
        assert_eq!(stored.snapshot().size(), 1024);
        let branches = store.list_branches(stored.id()).await.expect("branches");
        assert_eq!(branches.len(), 2);
        let default = branches.first().expect("default branch");
        assert!(default.is_default());
        assert_eq!(default.last_commit_message(), Some("Release"));
    });
}
