fn main() {
    tweetbucket::app::startup::startup();
}
